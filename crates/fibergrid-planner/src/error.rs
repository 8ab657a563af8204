//! Planner error types.

use thiserror::Error;

use fiber_core::{ArtifactId, ConfigError};

/// Errors that can occur during a planning run. All are terminal: the
/// planner performs no retries and returns no partial deployment.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed administrator parameters or invalid planning inputs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An instance has no feasible container for any of its candidates.
    #[error("{0}")]
    Feasibility(FeasibilityReport),

    /// The search space contains no structurally valid complete deployment.
    #[error("no valid deployment exists for the application graph")]
    SearchExhausted,
}

impl From<ConfigError> for PlanError {
    fn from(err: ConfigError) -> Self {
        PlanError::Configuration(err.to_string())
    }
}

pub type PlanResult<T> = Result<T, PlanError>;

/// Diagnostic payload for a feasibility failure. The display names the
/// instance and its spec; per-candidate detail is included when the
/// administrator asked for verbose diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibilityReport {
    pub instance: String,
    pub spec: String,
    pub verbose: bool,
    pub rejected: Vec<RejectedCandidate>,
}

/// One candidate that found no feasible container.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedCandidate {
    pub implementation: String,
    pub model: String,
    pub platform: String,
    pub artifact: ArtifactId,
}

impl std::fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no feasible container for instance {:?} (spec {:?})",
            self.instance, self.spec
        )?;
        if self.verbose {
            for r in &self.rejected {
                write!(
                    f,
                    "\n  rejected: implementation {:?} model {:?} platform {:?} artifact {}",
                    r.implementation, r.model, r.platform, r.artifact
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(verbose: bool) -> FeasibilityReport {
        FeasibilityReport {
            instance: "fir".to_string(),
            spec: "fir_filter".to_string(),
            verbose,
            rejected: vec![RejectedCandidate {
                implementation: "fir_hdl".to_string(),
                model: "fpga".to_string(),
                platform: "zynq".to_string(),
                artifact: 7,
            }],
        }
    }

    #[test]
    fn terse_report_names_instance_and_spec() {
        let msg = PlanError::Feasibility(sample_report(false)).to_string();
        assert!(msg.contains("fir"));
        assert!(msg.contains("fir_filter"));
        assert!(!msg.contains("fir_hdl"));
    }

    #[test]
    fn verbose_report_lists_rejected_candidates() {
        let msg = PlanError::Feasibility(sample_report(true)).to_string();
        assert!(msg.contains("fir_hdl"));
        assert!(msg.contains("zynq"));
        assert!(msg.contains("artifact 7"));
    }

    #[test]
    fn config_error_converts_to_configuration() {
        let err: PlanError = ConfigError::Invalid("bad score".to_string()).into();
        assert!(matches!(err, PlanError::Configuration(msg) if msg.contains("bad score")));
    }
}
