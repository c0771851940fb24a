//! Deployment configuration.
//!
//! The entire deployment is described by one TOML file (`strata.toml` by
//! default) with four sections: `[aws]`, `[cluster]`, `[iam]`, and
//! `[storage]`. The file is loaded once per command invocation and handed
//! to pure functions — no SQL or client construction happens at load time.
//!
//! AWS credentials are intentionally absent: the SDK's default provider
//! chain (environment, shared profile, instance metadata) supplies them.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level deployment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConfig {
    /// AWS region and endpoint settings.
    #[serde(default)]
    pub aws: AwsConfig,
    /// Cluster sizing, identity, and database credentials.
    pub cluster: ClusterConfig,
    /// IAM role and policy used for object-storage reads.
    pub iam: IamConfig,
    /// Object-storage locations of the source data.
    pub storage: StorageConfig,
}

impl WarehouseConfig {
    /// Loads and validates the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read, fails to
    /// parse, or fails validation.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let c = &self.cluster;
        if c.identifier.is_empty() {
            return Err(Error::config("cluster.identifier must not be empty"));
        }
        if c.node_type.is_empty() {
            return Err(Error::config("cluster.node_type must not be empty"));
        }
        if c.number_of_nodes == 0 {
            return Err(Error::config("cluster.number_of_nodes must be at least 1"));
        }
        match c.cluster_type {
            ClusterType::MultiNode if c.number_of_nodes < 2 => {
                return Err(Error::config(
                    "cluster.cluster_type = \"multi-node\" requires at least 2 nodes",
                ));
            }
            ClusterType::SingleNode if c.number_of_nodes != 1 => {
                return Err(Error::config(
                    "cluster.cluster_type = \"single-node\" requires exactly 1 node",
                ));
            }
            _ => {}
        }
        if c.database.is_empty() || c.master_username.is_empty() {
            return Err(Error::config(
                "cluster.database and cluster.master_username must not be empty",
            ));
        }
        if c.master_password.is_empty() {
            return Err(Error::config("cluster.master_password must not be empty"));
        }
        if self.iam.role_name.is_empty() {
            return Err(Error::config("iam.role_name must not be empty"));
        }
        for (key, uri) in [
            ("storage.events_uri", &self.storage.events_uri),
            ("storage.events_jsonpaths", &self.storage.events_jsonpaths),
            ("storage.songs_uri", &self.storage.songs_uri),
        ] {
            if !uri.starts_with("s3://") {
                return Err(Error::config(format!("{key} must be an s3:// URI")));
            }
        }
        Ok(())
    }
}

/// AWS region and endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Region the cluster, role, and source buckets live in.
    pub region: String,
    /// Endpoint override for localstack-style test deployments.
    pub endpoint_url: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            endpoint_url: None,
        }
    }
}

/// Cluster topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterType {
    /// Leader plus compute nodes; requires `number_of_nodes >= 2`.
    MultiNode,
    /// A single combined node.
    SingleNode,
}

impl ClusterType {
    /// The wire value the cluster service expects.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiNode => "multi-node",
            Self::SingleNode => "single-node",
        }
    }
}

/// Cluster sizing, identity, and database credentials.
#[derive(Clone, Deserialize)]
pub struct ClusterConfig {
    /// Cluster identifier, unique per account and region.
    pub identifier: String,
    /// Cluster topology.
    #[serde(default = "default_cluster_type")]
    pub cluster_type: ClusterType,
    /// Node instance type (e.g. `dc2.large`).
    pub node_type: String,
    /// Number of compute nodes.
    pub number_of_nodes: u32,
    /// Name of the analytics database created with the cluster.
    pub database: String,
    /// Master username for the database.
    pub master_username: String,
    /// Master password for the database.
    pub master_password: String,
    /// Database port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database host override. When unset, commands that need a connection
    /// resolve the host from the cluster's endpoint.
    #[serde(default)]
    pub host: Option<String>,
}

impl std::fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("identifier", &self.identifier)
            .field("cluster_type", &self.cluster_type)
            .field("node_type", &self.node_type)
            .field("number_of_nodes", &self.number_of_nodes)
            .field("database", &self.database)
            .field("master_username", &self.master_username)
            .field("master_password", &"[REDACTED]")
            .field("port", &self.port)
            .field("host", &self.host)
            .finish()
    }
}

fn default_cluster_type() -> ClusterType {
    ClusterType::MultiNode
}

fn default_port() -> u16 {
    5439
}

/// IAM role and policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IamConfig {
    /// Name of the role the cluster assumes to read object storage.
    pub role_name: String,
    /// ARN of the managed policy attached to the role.
    #[serde(default = "default_policy_arn")]
    pub policy_arn: String,
}

fn default_policy_arn() -> String {
    "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess".to_string()
}

/// Object-storage locations of the source data.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Prefix of the raw event (song-play log) JSON files.
    pub events_uri: String,
    /// JSONPaths mapping file for the event files.
    pub events_jsonpaths: String,
    /// Prefix of the song/artist catalog JSON files.
    pub songs_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [aws]
        region = "us-west-2"

        [cluster]
        identifier = "dwh-cluster"
        node_type = "dc2.large"
        number_of_nodes = 4
        database = "dwh"
        master_username = "dwhuser"
        master_password = "Passw0rd"

        [iam]
        role_name = "dwhRole"

        [storage]
        events_uri = "s3://udacity-dend/log_data"
        events_jsonpaths = "s3://udacity-dend/log_json_path.json"
        songs_uri = "s3://udacity-dend/song_data"
    "#;

    fn parse(toml: &str) -> WarehouseConfig {
        toml::from_str(toml).expect("config parses")
    }

    #[test]
    fn example_parses_and_validates() {
        let config = parse(EXAMPLE);
        config.validate().expect("valid");
        assert_eq!(config.cluster.port, 5439);
        assert_eq!(config.cluster.cluster_type, ClusterType::MultiNode);
        assert_eq!(
            config.iam.policy_arn,
            "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess"
        );
        assert!(config.cluster.host.is_none());
    }

    #[test]
    fn multi_node_requires_multiple_nodes() {
        let mut config = parse(EXAMPLE);
        config.cluster.number_of_nodes = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("multi-node"));
    }

    #[test]
    fn single_node_requires_exactly_one() {
        let mut config = parse(EXAMPLE);
        config.cluster.cluster_type = ClusterType::SingleNode;
        config.cluster.number_of_nodes = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn storage_uris_must_be_s3() {
        let mut config = parse(EXAMPLE);
        config.storage.songs_uri = "http://example.com/song_data".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("songs_uri"));
    }

    #[test]
    fn debug_redacts_master_password() {
        let config = parse(EXAMPLE);
        let rendered = format!("{:?}", config.cluster);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("Passw0rd"));
    }
}
