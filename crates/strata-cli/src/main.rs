//! strata CLI - warehouse provisioning and star-schema ETL.
//!
//! The main entry point for the `strata` binary.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strata_cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let Cli {
        config,
        format,
        command,
    } = Cli::parse();

    // Create runtime and execute
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match command {
            Commands::Provision(args) => commands::provision::execute(args, &config, &format).await,
            Commands::Status(args) => commands::status::execute(&args, &config, &format).await,
            Commands::CreateTables(args) => {
                commands::create_tables::execute(&args, &config, &format).await
            }
            Commands::Load(args) => commands::load::execute(&args, &config, &format).await,
            Commands::Destroy(args) => commands::destroy::execute(args, &config, &format).await,
        }
    })
}
