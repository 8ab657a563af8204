use fibergrid_planner::{DenyList, Plan};

use super::load_inputs;

pub fn run(
    app: &str,
    containers: &str,
    params: Option<&str>,
    format: &str,
) -> anyhow::Result<()> {
    let (graph, catalog, params) = load_inputs(app, containers, params)?;
    let rules = DenyList::new(params.incompatible.clone());

    let plan = fibergrid_planner::plan(&graph, &catalog, &rules, &params)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        _ => print_plan(&plan),
    }

    Ok(())
}

fn print_plan(plan: &Plan) {
    println!("plan score: {} ({} containers)", plan.score, plan.containers.len());
    for p in &plan.placements {
        let marker = if p.exclusive { " (exclusive)" } else { "" };
        println!(
            "  {:<20} {:<24} @ {}{}",
            p.instance, p.implementation, p.container_name, marker
        );
    }
    let names: Vec<&str> = plan.containers.iter().map(|c| c.name.as_str()).collect();
    println!("containers: {}", names.join(", "));
}
