//! Provision command - role, policy, cluster, wait until available.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use strata_core::PollPolicy;
use strata_provision::{
    bind_policy, ensure_role, provision, trust_policy, ClusterSpec, DEFAULT_TRUST_PRINCIPAL,
};

use crate::context::WarehouseContext;
use crate::OutputFormat;

/// Arguments for the provision command.
#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Seconds between the first status polls (backs off from there).
    #[arg(long, default_value = "10")]
    pub poll_interval: u64,

    /// Maximum status polls before giving up.
    #[arg(long, default_value = "60")]
    pub max_attempts: u32,
}

impl ProvisionArgs {
    fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_secs(self.poll_interval),
            max_attempts: self.max_attempts,
            ..PollPolicy::default()
        }
    }
}

/// Execute the provision command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, any identity or
/// cluster call fails, or the cluster does not become available within the
/// attempt budget.
pub async fn execute(args: ProvisionArgs, config_path: &Path, format: &OutputFormat) -> Result<()> {
    let ctx = WarehouseContext::load(config_path).await?;

    let identity = ctx.identity();
    let trust = trust_policy(DEFAULT_TRUST_PRINCIPAL);
    let role = ensure_role(&identity, &ctx.config.iam.role_name, &trust).await?;
    bind_policy(&identity, &role.name, &ctx.config.iam.policy_arn).await?;

    let clusters = ctx.clusters();
    let spec = ClusterSpec::from_config(&ctx.config.cluster, &role.arn);
    println!("Provisioning cluster {}...", spec.identifier);
    let description = provision(&clusters, &args.poll_policy(), &spec).await?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "clusterIdentifier": description.identifier,
                    "status": description.status.to_string(),
                    "endpoint": description.endpoint,
                    "roleArn": role.arn,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Cluster is available!");
            println!();
            println!("  Identifier: {}", description.identifier);
            println!(
                "  Endpoint:   {}",
                description.endpoint.as_deref().unwrap_or("-")
            );
            println!("  Role ARN:   {}", role.arn);
        }
    }

    Ok(())
}
