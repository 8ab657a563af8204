//! Structural-compatibility rules for wired instance pairs.
//!
//! When the search has assigned implementations to two connected
//! instances, these rules decide whether the pairing is allowed. The rule
//! source is external input to the planner: implementations prewired
//! inside the same prebuilt artifact must not be paired with conflicting
//! counterparts.

use fiber_core::{Implementation, IncompatiblePair};

/// Veto predicate consulted by the connectivity checker. Returning `true`
/// rejects the pairing of `a` and `b` across `a`'s port `port` (the
/// `port_index`-th port of `a`'s implementation).
pub trait ConnectionRules {
    fn bad_connection(
        &self,
        a: &Implementation,
        b: &Implementation,
        port: &str,
        port_index: usize,
    ) -> bool;
}

/// Accepts every pairing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl ConnectionRules for Unrestricted {
    fn bad_connection(&self, _: &Implementation, _: &Implementation, _: &str, _: usize) -> bool {
        false
    }
}

/// Table-driven rules: a pairing is vetoed when the two implementation
/// names appear together in the deny table (in either order), optionally
/// restricted to a single port name.
#[derive(Debug, Clone, Default)]
pub struct DenyList {
    pairs: Vec<IncompatiblePair>,
}

impl DenyList {
    pub fn new(pairs: Vec<IncompatiblePair>) -> Self {
        Self { pairs }
    }
}

impl ConnectionRules for DenyList {
    fn bad_connection(
        &self,
        a: &Implementation,
        b: &Implementation,
        port: &str,
        _port_index: usize,
    ) -> bool {
        self.pairs.iter().any(|pair| {
            let names_match = (pair.a == a.name && pair.b == b.name)
                || (pair.a == b.name && pair.b == a.name);
            names_match && pair.port.as_deref().is_none_or(|p| p == port)
        })
    }
}
