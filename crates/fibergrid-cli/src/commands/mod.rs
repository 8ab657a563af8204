pub mod check;
pub mod plan;

use std::path::Path;

use fiber_core::{AppGraph, PlanParams};
use fibergrid_catalog::InMemoryCatalog;

/// Load the three planner input documents.
pub fn load_inputs(
    app: &str,
    containers: &str,
    params: Option<&str>,
) -> anyhow::Result<(AppGraph, InMemoryCatalog, PlanParams)> {
    let graph = AppGraph::from_file(Path::new(app))?;
    let catalog = InMemoryCatalog::from_file(Path::new(containers))?;
    let params = match params {
        Some(path) => PlanParams::from_file(Path::new(path))?,
        None => PlanParams::default(),
    };
    Ok((graph, catalog, params))
}
