//! Create-tables command - drop and recreate the warehouse schema.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use strata_core::schema;
use strata_etl::{reset_schema, PostgresExecutor};

use crate::context::WarehouseContext;
use crate::OutputFormat;

/// Arguments for the create-tables command.
#[derive(Debug, Args)]
pub struct CreateTablesArgs {}

/// Execute the create-tables command.
///
/// # Errors
///
/// Returns an error if the host cannot be resolved, the connection fails,
/// or any DDL statement fails. Statements before the failing one stay
/// applied.
pub async fn execute(
    _args: &CreateTablesArgs,
    config_path: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let ctx = WarehouseContext::load(config_path).await?;
    let host = ctx.resolve_host().await?;

    println!("Resetting warehouse schema on {host}...");
    let executor = PostgresExecutor::connect(&host, &ctx.config.cluster).await?;
    reset_schema(&executor).await?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "tables": schema::TABLES,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Created {} tables:", schema::TABLES.len());
            for table in schema::TABLES {
                println!("  {table}");
            }
        }
    }

    Ok(())
}
