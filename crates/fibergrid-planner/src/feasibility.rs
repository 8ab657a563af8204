//! Feasibility scanning.
//!
//! For each instance, for each candidate, queries the container catalog
//! (narrowed by any administrator filter for that instance) and
//! accumulates a container mask. An instance whose candidates find no
//! container at all is fatal: planning aborts before any search begins.

use tracing::debug;

use fiber_core::{AppGraph, InstanceFilter, PlanParams};
use fibergrid_catalog::ContainerCatalog;

use crate::error::{FeasibilityReport, PlanError, PlanResult, RejectedCandidate};
use crate::mask::ContainerMask;

/// Per-instance, per-candidate container masks, indexed
/// `[instance][candidate]`.
pub type FeasibilityMap = Vec<Vec<ContainerMask>>;

/// Compute the feasibility map for the whole graph.
pub fn scan(
    graph: &AppGraph,
    catalog: &dyn ContainerCatalog,
    params: &PlanParams,
) -> PlanResult<FeasibilityMap> {
    let width = catalog.containers().len();
    let mut map = Vec::with_capacity(graph.instances.len());

    for instance in &graph.instances {
        let filter = params.filter_for(&instance.name);
        let mut union = ContainerMask::new(width);
        let mut masks = Vec::with_capacity(instance.candidates.len());
        let mut rejected = Vec::new();

        for candidate in &instance.candidates {
            let imp = &candidate.implementation;
            let mut mask = ContainerMask::new(width);

            if filter_admits(filter, imp) {
                let name_filter = filter.and_then(|f| f.container.as_deref());
                for ordinal in catalog.find_containers(imp, name_filter) {
                    mask.set(ordinal);
                }
            }

            if mask.is_empty() {
                debug!(
                    instance = %instance.name,
                    implementation = %imp.name,
                    model = %imp.model,
                    platform = %imp.platform,
                    "candidate has no feasible container"
                );
                rejected.push(RejectedCandidate {
                    implementation: imp.name.clone(),
                    model: imp.model.clone(),
                    platform: imp.platform.clone(),
                    artifact: candidate.artifact,
                });
            }

            union.union_with(&mask);
            masks.push(mask);
        }

        if union.is_empty() {
            return Err(PlanError::Feasibility(FeasibilityReport {
                instance: instance.name.clone(),
                spec: instance.spec.clone(),
                verbose: params.verbose,
                rejected,
            }));
        }

        debug!(
            instance = %instance.name,
            candidates = instance.candidates.len(),
            feasible_containers = union.count(),
            "instance feasibility scanned"
        );
        map.push(masks);
    }

    Ok(map)
}

/// Administrator model/platform overrides reject candidates outright.
fn filter_admits(filter: Option<&InstanceFilter>, imp: &fiber_core::Implementation) -> bool {
    let Some(filter) = filter else { return true };
    if filter.model.as_deref().is_some_and(|m| m != imp.model) {
        return false;
    }
    if filter.platform.as_deref().is_some_and(|p| p != imp.platform) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiber_core::{Candidate, Implementation, InstanceSpec};
    use fibergrid_catalog::{Container, InMemoryCatalog};

    fn make_container(name: &str, model: &str, platform: &str) -> Container {
        Container {
            name: name.to_string(),
            model: model.to_string(),
            platform: platform.to_string(),
        }
    }

    fn make_candidate(name: &str, model: &str, platform: &str) -> Candidate {
        Candidate {
            implementation: Implementation {
                name: name.to_string(),
                model: model.to_string(),
                platform: platform.to_string(),
                ports: Vec::new(),
                ordinal: 0,
            },
            score: 1,
            exclusive: false,
            artifact: 0,
        }
    }

    fn make_instance(name: &str, candidates: Vec<Candidate>) -> InstanceSpec {
        InstanceSpec {
            name: name.to_string(),
            spec: format!("{name}_spec"),
            candidates,
        }
    }

    fn sample_catalog() -> InMemoryCatalog {
        InMemoryCatalog::with_containers(vec![
            make_container("rcc0", "proc", "linux-x86_64"),
            make_container("rcc1", "proc", "linux-x86_64"),
            make_container("fpga0", "fpga", "zynq"),
        ])
    }

    #[test]
    fn accumulates_masks_per_candidate() {
        let graph = AppGraph {
            instances: vec![make_instance(
                "worker",
                vec![
                    make_candidate("worker_proc", "proc", "linux-x86_64"),
                    make_candidate("worker_hdl", "fpga", "zynq"),
                ],
            )],
            connections: Vec::new(),
        };

        let map = scan(&graph, &sample_catalog(), &PlanParams::default()).unwrap();

        assert_eq!(map[0][0].ones().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(map[0][1].ones().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn empty_union_is_fatal_and_names_the_instance() {
        let graph = AppGraph {
            instances: vec![make_instance(
                "orphan",
                vec![make_candidate("orphan_hdl", "fpga", "virtex")],
            )],
            connections: Vec::new(),
        };

        let err = scan(&graph, &sample_catalog(), &PlanParams::default()).unwrap_err();
        match err {
            PlanError::Feasibility(report) => {
                assert_eq!(report.instance, "orphan");
                assert_eq!(report.spec, "orphan_spec");
                assert_eq!(report.rejected.len(), 1);
                assert_eq!(report.rejected[0].implementation, "orphan_hdl");
            }
            other => panic!("expected feasibility error, got {other:?}"),
        }
    }

    #[test]
    fn named_container_filter_narrows_mask() {
        let params = PlanParams::from_toml_str(
            r#"
[instances.worker]
container = "rcc1"
"#,
        )
        .unwrap();

        let graph = AppGraph {
            instances: vec![make_instance(
                "worker",
                vec![make_candidate("worker_proc", "proc", "linux-x86_64")],
            )],
            connections: Vec::new(),
        };

        let map = scan(&graph, &sample_catalog(), &params).unwrap();
        assert_eq!(map[0][0].ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn model_filter_rejects_other_models() {
        let params = PlanParams::from_toml_str(
            r#"
[instances.worker]
model = "fpga"
"#,
        )
        .unwrap();

        let graph = AppGraph {
            instances: vec![make_instance(
                "worker",
                vec![
                    make_candidate("worker_proc", "proc", "linux-x86_64"),
                    make_candidate("worker_hdl", "fpga", "zynq"),
                ],
            )],
            connections: Vec::new(),
        };

        let map = scan(&graph, &sample_catalog(), &params).unwrap();
        assert!(map[0][0].is_empty());
        assert_eq!(map[0][1].ones().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn filter_on_other_instances_does_not_apply() {
        let params = PlanParams::from_toml_str(
            r#"
[instances.other]
model = "fpga"
"#,
        )
        .unwrap();

        let graph = AppGraph {
            instances: vec![make_instance(
                "worker",
                vec![make_candidate("worker_proc", "proc", "linux-x86_64")],
            )],
            connections: Vec::new(),
        };

        let map = scan(&graph, &sample_catalog(), &params).unwrap();
        assert_eq!(map[0][0].count(), 2);
    }
}
