use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fiber",
    about = "Fibergrid — component application deployment planner",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a deployment of the application graph onto the catalog.
    ///
    /// The search is exhaustive and globally optimal over the declared
    /// candidates and containers; it is intended for assemblies of tens
    /// of instances.
    Plan {
        /// Application graph document
        #[arg(short, long)]
        app: String,
        /// Container catalog document
        #[arg(short, long)]
        containers: String,
        /// Administrator parameters document
        #[arg(short, long)]
        params: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Validate the inputs and report per-candidate container feasibility
    /// without searching.
    Check {
        /// Application graph document
        #[arg(short, long)]
        app: String,
        /// Container catalog document
        #[arg(short, long)]
        containers: String,
        /// Administrator parameters document
        #[arg(short, long)]
        params: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fibergrid_planner=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            app,
            containers,
            params,
            format,
        } => commands::plan::run(&app, &containers, params.as_deref(), &format),
        Commands::Check {
            app,
            containers,
            params,
        } => commands::check::run(&app, &containers, params.as_deref()),
    }
}
