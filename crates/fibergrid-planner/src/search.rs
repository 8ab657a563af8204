//! Exhaustive backtracking search for the best-scoring deployment.
//!
//! Explores (candidate × container) choices per instance in declaration
//! order, applying the connectivity and booking checks incrementally, and
//! keeps the highest-scoring complete assignment found. Depth-first and
//! single-threaded: correctness of backtracking relies on the guarded
//! save/restore of the one booking entry a tentative lock touches, not on
//! any global undo log.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use fiber_core::{AppGraph, Candidate};

use crate::booking::Booking;
use crate::error::{PlanError, PlanResult};
use crate::feasibility::FeasibilityMap;
use crate::rules::ConnectionRules;

/// One instance's (candidate, container) choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub candidate: usize,
    pub container: usize,
}

/// Immutable view of one search: the graph, the feasibility map, the
/// connection rules, and the catalog width.
pub struct Search<'a> {
    graph: &'a AppGraph,
    feasibility: &'a FeasibilityMap,
    rules: &'a dyn ConnectionRules,
    container_count: usize,
}

/// Mutable search state, exclusively owned by the single active call
/// stack. The working assignment vector is mutated destructively through
/// the recursion; bookings are restored on backtrack.
pub struct SearchState {
    bookings: Vec<Booking>,
    working: Vec<Assignment>,
    best: Vec<Assignment>,
    /// Aggregate score of `best`; 0 is the "nothing found" sentinel
    /// (candidate scores are validated >= 1).
    best_score: u64,
}

impl SearchState {
    pub fn new(instance_count: usize, container_count: usize) -> Self {
        Self {
            bookings: vec![Booking::default(); container_count],
            working: vec![Assignment::default(); instance_count],
            best: vec![Assignment::default(); instance_count],
            best_score: 0,
        }
    }

    pub fn best(&self) -> &[Assignment] {
        &self.best
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }
}

impl<'a> Search<'a> {
    pub fn new(
        graph: &'a AppGraph,
        feasibility: &'a FeasibilityMap,
        rules: &'a dyn ConnectionRules,
        container_count: usize,
    ) -> Self {
        Self {
            graph,
            feasibility,
            rules,
            container_count,
        }
    }

    /// Explore the whole tree. Returns the winning score, or
    /// [`PlanError::SearchExhausted`] when no structurally valid complete
    /// deployment exists.
    pub fn run(&self, state: &mut SearchState) -> PlanResult<u64> {
        self.explore(state, 0, 0);
        if state.best_score == 0 {
            return Err(PlanError::SearchExhausted);
        }
        debug!(score = state.best_score, "search complete");
        Ok(state.best_score)
    }

    fn explore(&self, state: &mut SearchState, instance: usize, score: u64) {
        let candidate_count = self.graph.instances[instance].candidates.len();

        for ci in 0..candidate_count {
            if !self.connections_ok(state, instance, ci) {
                continue;
            }
            let cand = &self.graph.instances[instance].candidates[ci];
            let cand_score = u64::from(cand.score);

            for container in 0..self.container_count {
                if !self.feasibility[instance][ci].contains(container) {
                    continue;
                }
                if !state.bookings[container].admits(cand) {
                    continue;
                }

                state.working[instance] = Assignment {
                    candidate: ci,
                    container,
                };

                if cand.exclusive {
                    // Each physically distinct artifact occupies a specific
                    // container, so every matching container is explored.
                    self.with_tentative_lock(state, container, cand, |search, st| {
                        search.descend(st, instance, score + cand_score);
                    });
                } else {
                    self.descend(state, instance, score + cand_score);
                    // A relocatable candidate's concrete container is decided
                    // by the placement policy; one representative suffices.
                    break;
                }
            }
        }
    }

    fn descend(&self, state: &mut SearchState, instance: usize, score: u64) {
        if instance + 1 == self.graph.instances.len() {
            if score > state.best_score {
                state.best.copy_from_slice(&state.working);
                state.best_score = score;
                debug!(score, "new best deployment");
            }
        } else {
            self.explore(state, instance + 1, score);
        }
    }

    /// Run `f` with `candidate` tentatively locked into `container`'s
    /// booking. The saved entry is restored when the scope exits,
    /// whatever the outcome of the deeper exploration.
    fn with_tentative_lock(
        &self,
        state: &mut SearchState,
        container: usize,
        candidate: &Candidate,
        f: impl FnOnce(&Self, &mut SearchState),
    ) {
        let saved = state.bookings[container].clone();
        state.bookings[container].lock(candidate);
        f(self, state);
        state.bookings[container] = saved;
    }

    /// Reject the candidate when a port wires it to an already-decided
    /// instance whose chosen implementation is structurally incompatible.
    /// Search order follows declaration order, so only strictly smaller
    /// instance indices have been decided.
    fn connections_ok(&self, state: &SearchState, instance: usize, candidate: usize) -> bool {
        let imp = &self.graph.instances[instance].candidates[candidate].implementation;

        for (port_index, port) in imp.ports.iter().enumerate() {
            let Some(other) = self.graph.connected_instance(instance, port) else {
                continue;
            };
            if other >= instance {
                continue;
            }
            let chosen = state.working[other];
            let other_imp =
                &self.graph.instances[other].candidates[chosen.candidate].implementation;
            if self.rules.bad_connection(imp, other_imp, port, port_index) {
                trace!(
                    instance,
                    implementation = %imp.name,
                    peer = %other_imp.name,
                    port = %port,
                    "candidate rejected by connection rules"
                );
                return false;
            }
        }
        true
    }
}
