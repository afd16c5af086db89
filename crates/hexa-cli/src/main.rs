//! Hexa mesher command-line entry point

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "hexa_cli=info,hexa_mesh=info,hexa_geom=info";

/// Multi-block hexahedral mesher
#[derive(Parser)]
#[command(name = "hexa")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-block structured hexahedral mesh generator", long_about = None)]
struct Cli {
    /// Log filter (e.g. "debug" or "hexa_mesh=trace"); overrides RUST_LOG
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh the object described by a job file
    Build(commands::build::BuildArgs),
    /// Show the topology of a job's object
    Info(commands::info::InfoArgs),
    /// Print the default mesher configuration
    Defaults,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Defaults => commands::defaults::execute(),
    }
}
