use fibergrid_catalog::ContainerCatalog;
use fibergrid_planner::scan;

use super::load_inputs;

pub fn run(app: &str, containers: &str, params: Option<&str>) -> anyhow::Result<()> {
    let (graph, catalog, params) = load_inputs(app, containers, params)?;

    let map = scan(&graph, &catalog, &params)?;
    let names: Vec<&str> = catalog
        .containers()
        .iter()
        .map(|c| c.name.as_str())
        .collect();

    for (instance, masks) in graph.instances.iter().zip(&map) {
        println!("instance {} ({})", instance.name, instance.spec);
        for (candidate, mask) in instance.candidates.iter().zip(masks) {
            let imp = &candidate.implementation;
            let feasible: Vec<&str> = mask.ones().map(|k| names[k]).collect();
            let hosts = if feasible.is_empty() {
                "none".to_string()
            } else {
                feasible.join(", ")
            };
            println!(
                "  {} [{}/{}] -> {}",
                imp.name,
                imp.model,
                if imp.platform.is_empty() { "any" } else { &imp.platform },
                hosts
            );
        }
    }

    Ok(())
}
