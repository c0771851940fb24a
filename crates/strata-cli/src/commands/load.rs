//! Load command - staging copies, transforms, row-count summary.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use strata_core::sql;
use strata_etl::{load_staging, run_transforms, table_counts, PostgresExecutor};

use crate::context::WarehouseContext;
use crate::OutputFormat;

/// Arguments for the load command.
#[derive(Debug, Args)]
pub struct LoadArgs {}

/// Execute the load command.
///
/// Staging tables are fully loaded before any transform runs; the
/// transforms populate the dimensions before the fact table. A failure
/// aborts immediately — statements already committed stay committed.
///
/// # Errors
///
/// Returns an error if the role or host cannot be resolved, the connection
/// fails, or any statement fails.
pub async fn execute(_args: &LoadArgs, config_path: &Path, format: &OutputFormat) -> Result<()> {
    let ctx = WarehouseContext::load(config_path).await?;
    let role_arn = ctx.resolve_role_arn().await?;
    let host = ctx.resolve_host().await?;

    let executor = PostgresExecutor::connect(&host, &ctx.config.cluster).await?;

    println!("Loading staging tables...");
    let copies = sql::copy_statements(&ctx.config.storage, &ctx.config.aws, &role_arn);
    load_staging(&executor, &copies).await?;

    println!("Running star-schema transforms...");
    run_transforms(&executor).await?;

    let counts = table_counts(&executor).await?;
    match format {
        OutputFormat::Json => {
            let mut summary = serde_json::Map::new();
            for (table, count) in &counts {
                summary.insert((*table).to_string(), serde_json::Value::from(*count));
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::Value::Object(summary))?
            );
        }
        OutputFormat::Text => {
            println!("Load complete!");
            println!();
            println!("Row counts:");
            for (table, count) in &counts {
                println!("  {table:<16} {count}");
            }
        }
    }

    Ok(())
}
