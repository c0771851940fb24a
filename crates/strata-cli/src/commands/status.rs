//! Status command - one-shot cluster describe.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use strata_provision::{ClusterApi, ClusterStatus};

use crate::context::WarehouseContext;
use crate::OutputFormat;

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {}

/// Execute the status command.
///
/// An absent cluster is reported, not treated as a failure.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the describe call
/// fails for a reason other than absence.
pub async fn execute(_args: &StatusArgs, config_path: &Path, format: &OutputFormat) -> Result<()> {
    let ctx = WarehouseContext::load(config_path).await?;
    let identifier = &ctx.config.cluster.identifier;

    match ctx.clusters().describe_cluster(identifier).await {
        Ok(description) => match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "clusterIdentifier": description.identifier,
                        "status": description.status.to_string(),
                        "endpoint": description.endpoint,
                        "roleArns": description.role_arns,
                    }))?
                );
            }
            OutputFormat::Text => {
                println!("Cluster: {}", description.identifier);
                println!("Status:  {}", format_status_colored(&description.status));
                if let Some(endpoint) = &description.endpoint {
                    println!(
                        "Endpoint: {endpoint}:{}",
                        ctx.config.cluster.port
                    );
                }
                for arn in &description.role_arns {
                    println!("Role:    {arn}");
                }
            }
        },
        Err(e) if e.is_not_found() => match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "clusterIdentifier": identifier,
                        "status": "absent",
                    }))?
                );
            }
            OutputFormat::Text => {
                println!("Cluster: {identifier}");
                println!("Status:  {}", "absent".dimmed());
            }
        },
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn format_status_colored(status: &ClusterStatus) -> String {
    match status {
        ClusterStatus::Available => status.to_string().green().to_string(),
        ClusterStatus::Creating => status.to_string().yellow().to_string(),
        ClusterStatus::Deleting => status.to_string().red().to_string(),
        ClusterStatus::Other(_) => status.to_string(),
    }
}
