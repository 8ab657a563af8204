//! Top-level planning entry point.
//!
//! Pure function from declarative inputs (application graph, container
//! catalog, connection rules, administrator parameters) to a complete
//! deployment plan. Nothing outside the planner's own state is touched;
//! starting workers and wiring ports is the caller's concern.

use serde::{Deserialize, Serialize};
use tracing::info;

use fiber_core::{AppGraph, PlanParams, MAX_ARTIFACT_IMPLS};
use fibergrid_catalog::ContainerCatalog;

use crate::container_set::ContainerSet;
use crate::error::{PlanError, PlanResult};
use crate::feasibility;
use crate::mask::MAX_CONTAINERS;
use crate::placement::Placer;
use crate::rules::ConnectionRules;
use crate::search::{Search, SearchState};

/// One instance's final placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedInstance {
    pub instance: String,
    /// Index of the winning candidate in the instance's candidate list.
    pub candidate: usize,
    pub implementation: String,
    /// Global ordinal of the assigned container.
    pub container: usize,
    pub container_name: String,
    pub exclusive: bool,
}

/// A container selected by the plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedContainer {
    pub ordinal: usize,
    pub name: String,
}

/// A complete deployment plan: every instance assigned, ready for the
/// worker instantiation phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub placements: Vec<PlacedInstance>,
    /// Winning aggregate candidate score.
    pub score: u64,
    /// Containers in selection order.
    pub containers: Vec<PlannedContainer>,
}

/// Plan the deployment of `graph` onto the catalog's containers.
pub fn plan(
    graph: &AppGraph,
    catalog: &dyn ContainerCatalog,
    rules: &dyn ConnectionRules,
    params: &PlanParams,
) -> PlanResult<Plan> {
    validate(graph, catalog)?;

    let feasibility = feasibility::scan(graph, catalog, params)?;

    let container_count = catalog.containers().len();
    let search = Search::new(graph, &feasibility, rules, container_count);
    let mut state = SearchState::new(graph.instances.len(), container_count);
    let score = search.run(&mut state)?;

    let mut assignments = state.best().to_vec();

    // Exclusive winners occupy the containers the search picked for them.
    let mut set = ContainerSet::new(container_count);
    for (i, assignment) in assignments.iter().enumerate() {
        let candidate = &graph.instances[i].candidates[assignment.candidate];
        if candidate.exclusive && !set.contains(assignment.container) {
            set.add(assignment.container);
        }
    }

    // Relocatable instances get their real container from the policy.
    let mut placer = Placer::new(params.policy);
    for (i, assignment) in assignments.iter_mut().enumerate() {
        let candidate = &graph.instances[i].candidates[assignment.candidate];
        if !candidate.exclusive {
            assignment.container =
                placer.place(&feasibility[i][assignment.candidate], &mut set);
        }
    }

    let containers = catalog.containers();
    let placements = assignments
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let instance = &graph.instances[i];
            let candidate = &instance.candidates[a.candidate];
            PlacedInstance {
                instance: instance.name.clone(),
                candidate: a.candidate,
                implementation: candidate.implementation.name.clone(),
                container: a.container,
                container_name: containers[a.container].name.clone(),
                exclusive: candidate.exclusive,
            }
        })
        .collect();

    let chosen = set
        .ordinals()
        .iter()
        .map(|&ordinal| PlannedContainer {
            ordinal,
            name: containers[ordinal].name.clone(),
        })
        .collect();

    info!(
        score,
        instances = graph.instances.len(),
        containers = set.len(),
        "deployment plan complete"
    );

    Ok(Plan {
        placements,
        score,
        containers: chosen,
    })
}

/// Input validation ahead of any scanning or search.
fn validate(graph: &AppGraph, catalog: &dyn ContainerCatalog) -> PlanResult<()> {
    let container_count = catalog.containers().len();
    if container_count > MAX_CONTAINERS {
        return Err(PlanError::Configuration(format!(
            "catalog has {container_count} containers, limit is {MAX_CONTAINERS}"
        )));
    }
    if graph.instances.is_empty() {
        return Err(PlanError::Configuration(
            "application graph has no instances".to_string(),
        ));
    }

    for instance in &graph.instances {
        for candidate in &instance.candidates {
            if candidate.score == 0 {
                return Err(PlanError::Configuration(format!(
                    "candidate {:?} of instance {:?} has score 0 (must be >= 1)",
                    candidate.implementation.name, instance.name
                )));
            }
            if candidate.implementation.ordinal >= MAX_ARTIFACT_IMPLS {
                return Err(PlanError::Configuration(format!(
                    "implementation {:?} has ordinal {}, limit is {}",
                    candidate.implementation.name,
                    candidate.implementation.ordinal,
                    MAX_ARTIFACT_IMPLS
                )));
            }
        }
    }

    for connection in &graph.connections {
        for endpoint in [&connection.a, &connection.b] {
            if endpoint.instance >= graph.instances.len() {
                return Err(PlanError::Configuration(format!(
                    "connection references instance index {} out of range",
                    endpoint.instance
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Unrestricted;
    use fiber_core::{Candidate, Connection, Endpoint, Implementation, InstanceSpec};
    use fibergrid_catalog::{Container, InMemoryCatalog};

    fn make_container(name: &str, model: &str) -> Container {
        Container {
            name: name.to_string(),
            model: model.to_string(),
            platform: "p".to_string(),
        }
    }

    fn make_candidate(name: &str, model: &str, score: u32) -> Candidate {
        Candidate {
            implementation: Implementation {
                name: name.to_string(),
                model: model.to_string(),
                platform: "p".to_string(),
                ports: Vec::new(),
                ordinal: 0,
            },
            score,
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

    #[test]
    fn empty_graph_is_a_configuration_error() {
        let catalog = InMemoryCatalog::with_containers(vec![make_container("c0", "proc")]);
        let graph = AppGraph::default();

        let err = plan(&graph, &catalog, &Unrestricted, &PlanParams::default()).unwrap_err();
        assert!(matches!(err, PlanError::Configuration(_)));
    }

    #[test]
    fn zero_score_is_a_configuration_error() {
        let catalog = InMemoryCatalog::with_containers(vec![make_container("c0", "proc")]);
        let graph = AppGraph {
            instances: vec![make_instance("w", vec![make_candidate("w_proc", "proc", 0)])],
            connections: Vec::new(),
        };

        let err = plan(&graph, &catalog, &Unrestricted, &PlanParams::default()).unwrap_err();
        assert!(matches!(err, PlanError::Configuration(msg) if msg.contains("score 0")));
    }

    #[test]
    fn oversized_ordinal_is_a_configuration_error() {
        let catalog = InMemoryCatalog::with_containers(vec![make_container("c0", "proc")]);
        let mut candidate = make_candidate("w_proc", "proc", 1);
        candidate.implementation.ordinal = 64;
        let graph = AppGraph {
            instances: vec![make_instance("w", vec![candidate])],
            connections: Vec::new(),
        };

        let err = plan(&graph, &catalog, &Unrestricted, &PlanParams::default()).unwrap_err();
        assert!(matches!(err, PlanError::Configuration(msg) if msg.contains("ordinal")));
    }

    #[test]
    fn out_of_range_connection_is_a_configuration_error() {
        let catalog = InMemoryCatalog::with_containers(vec![make_container("c0", "proc")]);
        let graph = AppGraph {
            instances: vec![make_instance("w", vec![make_candidate("w_proc", "proc", 1)])],
            connections: vec![Connection {
                a: Endpoint {
                    instance: 0,
                    port: "out".to_string(),
                },
                b: Endpoint {
                    instance: 5,
                    port: "in".to_string(),
                },
            }],
        };

        let err = plan(&graph, &catalog, &Unrestricted, &PlanParams::default()).unwrap_err();
        assert!(matches!(err, PlanError::Configuration(msg) if msg.contains("out of range")));
    }

    #[test]
    fn plan_reports_names_alongside_ordinals() {
        let catalog = InMemoryCatalog::with_containers(vec![
            make_container("rcc0", "proc"),
            make_container("rcc1", "proc"),
        ]);
        let graph = AppGraph {
            instances: vec![make_instance("w", vec![make_candidate("w_proc", "proc", 3)])],
            connections: Vec::new(),
        };

        let result = plan(&graph, &catalog, &Unrestricted, &PlanParams::default()).unwrap();

        assert_eq!(result.score, 3);
        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.placements[0].implementation, "w_proc");
        assert_eq!(result.placements[0].container, 0);
        assert_eq!(result.placements[0].container_name, "rcc0");
        assert_eq!(result.containers.len(), 1);
        assert_eq!(result.containers[0].name, "rcc0");
    }

    #[test]
    fn plan_serializes_to_json() {
        let catalog = InMemoryCatalog::with_containers(vec![make_container("c0", "proc")]);
        let graph = AppGraph {
            instances: vec![make_instance("w", vec![make_candidate("w_proc", "proc", 1)])],
            connections: Vec::new(),
        };

        let result = plan(&graph, &catalog, &Unrestricted, &PlanParams::default()).unwrap();
        let json = serde_json::to_string(&result).unwrap();

        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
