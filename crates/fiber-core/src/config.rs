//! Administrator parameters for a planning run.
//!
//! Parsed once before planning from a TOML document:
//!
//! ```toml
//! verbose = true
//!
//! [policy]
//! max_processors = 4
//!
//! [instances.fir_filter]
//! container = "fpga0"
//! model = "fpga"
//!
//! [[incompatible]]
//! a = "fir_proc"
//! b = "mixer_hdl"
//! port = "out"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

/// How freely relocatable instances are spread across containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// Prefer a fresh container per instance, rotating through the chosen
    /// set once every feasible container is in use.
    RoundRobin,
    /// Reuse already-chosen containers first; only claim a fresh one when
    /// none of the chosen set is feasible.
    MinProcessors(u32),
    /// Round-robin until the chosen-container count reaches the cap, then
    /// rotate through the chosen set.
    MaxProcessors(u32),
}

impl Default for Policy {
    fn default() -> Self {
        Policy::RoundRobin
    }
}

/// Per-instance feasibility narrowing, looked up by instance name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceFilter {
    /// Restrict the instance to a single named container.
    pub container: Option<String>,
    /// Only consider candidates with this execution model.
    pub model: Option<String>,
    /// Only consider candidates built for this platform.
    pub platform: Option<String>,
}

/// A vetoed implementation pairing for wired instances, optionally
/// restricted to one port name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompatiblePair {
    pub a: String,
    pub b: String,
    pub port: Option<String>,
}

/// Validated administrator parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanParams {
    /// Include per-candidate detail in feasibility failures.
    pub verbose: bool,
    pub policy: Policy,
    pub instance_filters: HashMap<String, InstanceFilter>,
    pub incompatible: Vec<IncompatiblePair>,
}

/// Raw document form; policy keys are resolved by [`PlanParams`] with
/// first-match-wins precedence.
#[derive(Debug, Default, Deserialize)]
struct ParamsDoc {
    #[serde(default)]
    verbose: bool,
    #[serde(default)]
    policy: PolicyDoc,
    #[serde(default)]
    instances: HashMap<String, InstanceFilter>,
    #[serde(default)]
    incompatible: Vec<IncompatiblePair>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyDoc {
    max_processors: Option<u32>,
    min_processors: Option<u32>,
    round_robin: Option<bool>,
}

impl PlanParams {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let doc: ParamsDoc = toml::from_str(s)?;
        Ok(PlanParams {
            verbose: doc.verbose,
            policy: resolve_policy(&doc.policy),
            instance_filters: doc.instances,
            incompatible: doc.incompatible,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Filter for the named instance, if the administrator supplied one.
    pub fn filter_for(&self, instance: &str) -> Option<&InstanceFilter> {
        self.instance_filters.get(instance)
    }
}

/// Exactly one policy key is honored: max_processors, then
/// min_processors, then round_robin, first match wins. Default is
/// unbounded round-robin.
fn resolve_policy(doc: &PolicyDoc) -> Policy {
    if let Some(cap) = doc.max_processors {
        Policy::MaxProcessors(cap)
    } else if let Some(floor) = doc.min_processors {
        Policy::MinProcessors(floor)
    } else if doc.round_robin == Some(true) {
        Policy::RoundRobin
    } else {
        Policy::default()
    }
}
