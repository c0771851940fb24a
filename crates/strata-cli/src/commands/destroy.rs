//! Destroy command - release the role, delete the cluster, wait until gone.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use strata_core::PollPolicy;
use strata_provision::{decommission, release_role};

use crate::context::WarehouseContext;
use crate::OutputFormat;

/// Arguments for the destroy command.
#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Seconds between the first status polls (backs off from there).
    #[arg(long, default_value = "10")]
    pub poll_interval: u64,

    /// Maximum status polls before giving up.
    #[arg(long, default_value = "60")]
    pub max_attempts: u32,
}

impl DestroyArgs {
    fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_secs(self.poll_interval),
            max_attempts: self.max_attempts,
            ..PollPolicy::default()
        }
    }
}

/// Execute the destroy command.
///
/// Resources that are already absent count as success; the command is safe
/// to re-run after a partial teardown.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a teardown call fails
/// for a reason other than absence, or the cluster does not disappear
/// within the attempt budget.
pub async fn execute(args: DestroyArgs, config_path: &Path, format: &OutputFormat) -> Result<()> {
    let ctx = WarehouseContext::load(config_path).await?;

    let identity = ctx.identity();
    println!("Releasing service role {}...", ctx.config.iam.role_name);
    release_role(&identity, &ctx.config.iam.role_name, &ctx.config.iam.policy_arn).await?;

    let clusters = ctx.clusters();
    let identifier = &ctx.config.cluster.identifier;
    println!("Deleting cluster {identifier}...");
    decommission(&clusters, &args.poll_policy(), identifier).await?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "clusterIdentifier": identifier,
                    "status": "absent",
                    "roleName": ctx.config.iam.role_name,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Cluster {identifier} is gone.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_args_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: DestroyArgs,
        }

        let cli = TestCli::parse_from(["test", "--max-attempts", "120"]);
        assert_eq!(cli.args.poll_interval, 10);
        assert_eq!(cli.args.max_attempts, 120);
        assert_eq!(cli.args.poll_policy().max_attempts, 120);
    }
}
