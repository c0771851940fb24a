//! Shared command context.
//!
//! Loads the configuration once per invocation and hands out service
//! handles bound to the deployment's region. Host and role-ARN resolution
//! live here because every database-facing command needs them.

use std::path::Path;

use anyhow::{Context as _, Result};

use strata_core::WarehouseConfig;
use strata_provision::{aws, ClusterApi, IamIdentity, IdentityApi, RedshiftClusters};

/// Configuration plus the shared SDK configuration.
pub struct WarehouseContext {
    /// The validated deployment configuration.
    pub config: WarehouseConfig,
    sdk: aws_config::SdkConfig,
}

impl WarehouseContext {
    /// Loads and validates the configuration, then the SDK configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is missing or invalid.
    pub async fn load(config_path: &Path) -> Result<Self> {
        let config = WarehouseConfig::from_path(config_path)
            .with_context(|| format!("loading configuration from {}", config_path.display()))?;
        let sdk = aws::sdk_config(&config.aws).await;
        Ok(Self { config, sdk })
    }

    /// Identity service handle.
    #[must_use]
    pub fn identity(&self) -> IamIdentity {
        IamIdentity::new(&self.sdk)
    }

    /// Cluster service handle.
    #[must_use]
    pub fn clusters(&self) -> RedshiftClusters {
        RedshiftClusters::new(&self.sdk)
    }

    /// Resolves the database host: the configured override when set,
    /// otherwise the cluster's endpoint address.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is absent or has no endpoint yet.
    pub async fn resolve_host(&self) -> Result<String> {
        if let Some(host) = &self.config.cluster.host {
            return Ok(host.clone());
        }
        let identifier = &self.config.cluster.identifier;
        let description = self
            .clusters()
            .describe_cluster(identifier)
            .await
            .with_context(|| format!("resolving endpoint of cluster {identifier}"))?;
        description.endpoint.ok_or_else(|| {
            anyhow::anyhow!(
                "cluster {identifier} has no endpoint yet (status: {}); provision it first",
                description.status
            )
        })
    }

    /// Resolves the service role's ARN.
    ///
    /// # Errors
    ///
    /// Returns an error if the role does not exist.
    pub async fn resolve_role_arn(&self) -> Result<String> {
        let role_name = &self.config.iam.role_name;
        let role = self
            .identity()
            .get_role(role_name)
            .await
            .with_context(|| format!("resolving role {role_name}; run `strata provision` first"))?;
        Ok(role.arn)
    }
}
