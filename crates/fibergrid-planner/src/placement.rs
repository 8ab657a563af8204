//! Post-search placement of freely relocatable instances.
//!
//! The search fixes the containers of every artifact-pinned instance; the
//! placer then assigns concrete containers to the rest, per the
//! administrator-selected policy. This step cannot fail: every mask it
//! sees was already established non-empty by the feasibility scanner.

use tracing::debug;

use fiber_core::Policy;

use crate::container_set::ContainerSet;
use crate::mask::ContainerMask;

/// Stateful placement pass. The rotation cursor persists across
/// placements within one planning run.
pub struct Placer {
    policy: Policy,
    cursor: usize,
}

impl Placer {
    pub fn new(policy: Policy) -> Self {
        Self { policy, cursor: 0 }
    }

    /// Pick a container for one relocatable instance whose chosen
    /// candidate is feasible on `feasible`, claiming fresh containers
    /// through `set` as the policy allows.
    pub fn place(&mut self, feasible: &ContainerMask, set: &mut ContainerSet) -> usize {
        let pick = match self.policy {
            Policy::RoundRobin => self
                .claim_new(feasible, set)
                .or_else(|| self.rotate(feasible, set)),
            Policy::MaxProcessors(cap) => {
                if set.len() >= cap as usize {
                    // At the cap: rotate through the chosen set first. The
                    // cap is advisory; an instance no chosen container can
                    // host still gets a fresh one.
                    self.rotate(feasible, set)
                        .or_else(|| self.claim_new(feasible, set))
                } else {
                    self.claim_new(feasible, set)
                        .or_else(|| self.rotate(feasible, set))
                }
            }
            Policy::MinProcessors(_) => self
                .reuse_first(feasible, set)
                .or_else(|| self.claim_new(feasible, set)),
        };
        match pick {
            Some(container) => container,
            // The scanner guarantees a non-empty mask, and each arm covers
            // both the chosen and the unchosen feasible cases.
            None => unreachable!("placement reached with empty feasibility mask"),
        }
    }

    /// Claim the first feasible container that is not yet chosen.
    fn claim_new(&self, feasible: &ContainerMask, set: &mut ContainerSet) -> Option<usize> {
        let container = feasible.ones().find(|&k| !set.contains(k))?;
        set.add(container);
        debug!(container, total = set.len(), "claimed fresh container");
        Some(container)
    }

    /// Rotate forward through the chosen set from the persistent cursor,
    /// returning the first feasible container.
    fn rotate(&mut self, feasible: &ContainerMask, set: &ContainerSet) -> Option<usize> {
        let count = set.len();
        if count == 0 {
            return None;
        }
        for _ in 0..count {
            self.cursor = (self.cursor + 1) % count;
            let container = set.ordinals()[self.cursor];
            if feasible.contains(container) {
                return Some(container);
            }
        }
        None
    }

    /// First already-chosen feasible container, in chosen order.
    fn reuse_first(&self, feasible: &ContainerMask, set: &ContainerSet) -> Option<usize> {
        set.ordinals().iter().copied().find(|&k| feasible.contains(k))
    }
}
