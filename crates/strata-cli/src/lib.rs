//! # strata-cli
//!
//! Command-line interface for strata warehouse operations.
//!
//! ## Commands
//!
//! - `strata provision` - Create the service role and the cluster, wait until available
//! - `strata status` - Show the cluster's current status and endpoint
//! - `strata create-tables` - Drop and recreate the warehouse schema
//! - `strata load` - Load staging data and run the star-schema transforms
//! - `strata destroy` - Tear down the role and the cluster
//!
//! ## Configuration
//!
//! Every command reads the deployment description from a TOML file:
//!
//! - `--config` / `STRATA_CONFIG` - path to the file (default: `strata.toml`)
//!
//! AWS credentials come from the SDK's default provider chain.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod commands;
pub mod context;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// strata - warehouse provisioning and ETL command-line interface.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the deployment configuration file.
    #[arg(long, env = "STRATA_CONFIG", default_value = "strata.toml")]
    pub config: PathBuf,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands, one per orchestrator sequence.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the service role and the cluster, and wait until it is available.
    Provision(commands::provision::ProvisionArgs),
    /// Show the cluster's current status and endpoint.
    Status(commands::status::StatusArgs),
    /// Drop and recreate the staging, dimension, and fact tables.
    CreateTables(commands::create_tables::CreateTablesArgs),
    /// Load staging from object storage and run the star-schema transforms.
    Load(commands::load::LoadArgs),
    /// Detach the role bindings and delete the cluster, waiting until it is gone.
    Destroy(commands::destroy::DestroyArgs),
}

/// Output format.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["strata", "--config", "deploy/prod.toml", "--format", "json", "status"]);
        assert_eq!(cli.config, PathBuf::from("deploy/prod.toml"));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["strata", "provision"]);
        assert_eq!(cli.config, PathBuf::from("strata.toml"));
        assert!(matches!(cli.format, OutputFormat::Text));
    }
}
