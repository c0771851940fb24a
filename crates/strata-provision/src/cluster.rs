//! Cluster lifecycle.
//!
//! A polling state machine over `{absent, creating, available, deleting}`,
//! driven by the cluster service's authoritative status field — the caller
//! issues a create (or delete) request, then polls status under the
//! bounded [`PollPolicy`] until the terminal condition.
//!
//! The two directions are deliberately asymmetric: creation has an
//! observable positive terminal state (status equals `available`), while
//! deletion's terminal state is the absence of the resource itself — the
//! describe call failing with "not found" *is* the success signal, and only
//! that failure; every other error propagates.

use async_trait::async_trait;
use aws_sdk_redshift::error::SdkError;

use strata_core::config::{ClusterConfig, ClusterType};
use strata_core::poll::{wait_for, PollPolicy, PollState};
use strata_core::{Error, Result};

/// Cluster status as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterStatus {
    /// The cluster is ready to accept connections.
    Available,
    /// The cluster is being created.
    Creating,
    /// The cluster is being deleted.
    Deleting,
    /// Any other status string the service reports (resizing, rebooting...).
    Other(String),
}

impl ClusterStatus {
    /// Parses the service's status string, case-insensitively.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "creating" => Self::Creating,
            "deleting" => Self::Deleting,
            _ => Self::Other(status.to_string()),
        }
    }

    /// Returns true for the creation-side terminal state.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::Creating => f.write_str("creating"),
            Self::Deleting => f.write_str("deleting"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// Everything the cluster service needs to create the cluster.
#[derive(Clone)]
pub struct ClusterSpec {
    /// Cluster identifier.
    pub identifier: String,
    /// Cluster topology.
    pub cluster_type: ClusterType,
    /// Node instance type.
    pub node_type: String,
    /// Number of compute nodes.
    pub number_of_nodes: u32,
    /// Name of the database created with the cluster.
    pub database: String,
    /// Master username.
    pub master_username: String,
    /// Master password.
    pub master_password: String,
    /// ARN of the role the cluster assumes for object-storage reads.
    pub iam_role_arn: String,
}

impl ClusterSpec {
    /// Builds the spec from configuration plus the resolved role ARN.
    #[must_use]
    pub fn from_config(cluster: &ClusterConfig, role_arn: &str) -> Self {
        Self {
            identifier: cluster.identifier.clone(),
            cluster_type: cluster.cluster_type,
            node_type: cluster.node_type.clone(),
            number_of_nodes: cluster.number_of_nodes,
            database: cluster.database.clone(),
            master_username: cluster.master_username.clone(),
            master_password: cluster.master_password.clone(),
            iam_role_arn: role_arn.to_string(),
        }
    }
}

impl std::fmt::Debug for ClusterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSpec")
            .field("identifier", &self.identifier)
            .field("cluster_type", &self.cluster_type)
            .field("node_type", &self.node_type)
            .field("number_of_nodes", &self.number_of_nodes)
            .field("database", &self.database)
            .field("master_username", &self.master_username)
            .field("master_password", &"[REDACTED]")
            .field("iam_role_arn", &self.iam_role_arn)
            .finish()
    }
}

/// Snapshot of a cluster as reported by a describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDescription {
    /// Cluster identifier.
    pub identifier: String,
    /// Current lifecycle status.
    pub status: ClusterStatus,
    /// Endpoint address, assigned once the cluster is available.
    pub endpoint: Option<String>,
    /// ARNs of the roles bound to the cluster.
    pub role_arns: Vec<String>,
}

/// Outcome of a cluster creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateClusterOutcome {
    /// The creation request was accepted.
    Created,
    /// A cluster with that identifier already exists; wait for it instead.
    AlreadyExists,
}

/// Cluster service surface used by the orchestrators.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Issues the create request.
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<CreateClusterOutcome>;

    /// Describes the cluster.
    ///
    /// Absence surfaces as [`Error::ClusterNotFound`].
    async fn describe_cluster(&self, identifier: &str) -> Result<ClusterDescription>;

    /// Issues the delete request, skipping the final snapshot.
    ///
    /// Absence surfaces as [`Error::ClusterNotFound`].
    async fn delete_cluster(&self, identifier: &str) -> Result<()>;
}

/// Creates the cluster and waits until it is available.
///
/// An already-existing cluster is not a failure — the wait proceeds against
/// it, mirroring the role creation semantics. Each interim poll emits the
/// observed status; the returned descriptor carries the endpoint.
///
/// # Errors
///
/// Propagates creation and describe failures, and [`Error::Timeout`] if the
/// cluster does not become available within the policy's attempt budget.
pub async fn provision(
    api: &dyn ClusterApi,
    policy: &PollPolicy,
    spec: &ClusterSpec,
) -> Result<ClusterDescription> {
    match api.create_cluster(spec).await? {
        CreateClusterOutcome::Created => {
            tracing::info!(identifier = %spec.identifier, "cluster creation requested");
        }
        CreateClusterOutcome::AlreadyExists => {
            tracing::info!(identifier = %spec.identifier, "cluster already exists, waiting for it");
        }
    }

    let identifier = spec.identifier.clone();
    wait_for(policy, "cluster available", move |_| {
        let identifier = identifier.clone();
        async move {
            let description = api.describe_cluster(&identifier).await?;
            if description.status.is_available() {
                Ok(PollState::Ready(description))
            } else {
                Ok(PollState::Pending(description.status.to_string()))
            }
        }
    })
    .await
}

/// Deletes the cluster and waits until it is gone.
///
/// A cluster that is already absent — at the delete call or observed during
/// polling — is the desired terminal state and counts as success. Any other
/// describe failure propagates.
///
/// # Errors
///
/// Propagates non-absence failures, and [`Error::Timeout`] if the cluster
/// has not disappeared within the policy's attempt budget.
pub async fn decommission(
    api: &dyn ClusterApi,
    policy: &PollPolicy,
    identifier: &str,
) -> Result<()> {
    match api.delete_cluster(identifier).await {
        Ok(()) => tracing::info!(identifier, "cluster deletion requested"),
        Err(e) if e.is_not_found() => {
            tracing::info!(identifier, "cluster already absent");
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    let identifier_owned = identifier.to_string();
    wait_for(policy, "cluster deleted", move |_| {
        let identifier = identifier_owned.clone();
        async move {
            match api.describe_cluster(&identifier).await {
                Ok(description) => Ok(PollState::Pending(description.status.to_string())),
                Err(e) if e.is_not_found() => Ok(PollState::Ready(())),
                Err(e) => Err(e),
            }
        }
    })
    .await
}

/// Cluster adapter over the Redshift service.
pub struct RedshiftClusters {
    client: aws_sdk_redshift::Client,
}

impl RedshiftClusters {
    /// Creates the adapter from the shared SDK configuration.
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_redshift::Client::new(sdk_config),
        }
    }
}

impl std::fmt::Debug for RedshiftClusters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedshiftClusters").finish()
    }
}

#[async_trait]
impl ClusterApi for RedshiftClusters {
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<CreateClusterOutcome> {
        let mut request = self
            .client
            .create_cluster()
            .cluster_identifier(&spec.identifier)
            .cluster_type(spec.cluster_type.as_str())
            .node_type(&spec.node_type)
            .db_name(&spec.database)
            .master_username(&spec.master_username)
            .master_user_password(&spec.master_password)
            .iam_roles(&spec.iam_role_arn);
        // The service rejects an explicit node count for single-node clusters.
        if spec.cluster_type == ClusterType::MultiNode {
            let nodes = i32::try_from(spec.number_of_nodes)
                .map_err(|_| Error::cluster("number_of_nodes out of range"))?;
            request = request.number_of_nodes(nodes);
        }

        match request.send().await {
            Ok(_) => Ok(CreateClusterOutcome::Created),
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_cluster_already_exists_fault() {
                        return Ok(CreateClusterOutcome::AlreadyExists);
                    }
                }
                Err(Error::cluster_with_source(
                    format!("create cluster {}", spec.identifier),
                    err,
                ))
            }
        }
    }

    async fn describe_cluster(&self, identifier: &str) -> Result<ClusterDescription> {
        let result = self
            .client
            .describe_clusters()
            .cluster_identifier(identifier)
            .send()
            .await;
        match result {
            Ok(output) => {
                let cluster = output.clusters().first().ok_or_else(|| Error::ClusterNotFound {
                    identifier: identifier.to_string(),
                })?;
                Ok(ClusterDescription {
                    identifier: cluster
                        .cluster_identifier()
                        .unwrap_or(identifier)
                        .to_string(),
                    status: cluster
                        .cluster_status()
                        .map_or(ClusterStatus::Other("unknown".to_string()), ClusterStatus::parse),
                    endpoint: cluster
                        .endpoint()
                        .and_then(|e| e.address())
                        .map(str::to_string),
                    role_arns: cluster
                        .iam_roles()
                        .iter()
                        .filter_map(|role| role.iam_role_arn())
                        .map(str::to_string)
                        .collect(),
                })
            }
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_cluster_not_found_fault() {
                        return Err(Error::ClusterNotFound {
                            identifier: identifier.to_string(),
                        });
                    }
                }
                Err(Error::cluster_with_source(
                    format!("describe cluster {identifier}"),
                    err,
                ))
            }
        }
    }

    async fn delete_cluster(&self, identifier: &str) -> Result<()> {
        let result = self
            .client
            .delete_cluster()
            .cluster_identifier(identifier)
            .skip_final_cluster_snapshot(true)
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_cluster_not_found_fault() {
                        return Err(Error::ClusterNotFound {
                            identifier: identifier.to_string(),
                        });
                    }
                }
                Err(Error::cluster_with_source(
                    format!("delete cluster {identifier}"),
                    err,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DescribeStep, MemoryClusters};

    fn test_spec() -> ClusterSpec {
        ClusterSpec {
            identifier: "dwh-cluster".to_string(),
            cluster_type: ClusterType::MultiNode,
            node_type: "dc2.large".to_string(),
            number_of_nodes: 4,
            database: "dwh".to_string(),
            master_username: "dwhuser".to_string(),
            master_password: "Passw0rd".to_string(),
            iam_role_arn: "arn:aws:iam::000000000000:role/dwhRole".to_string(),
        }
    }

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(ClusterStatus::parse("Available"), ClusterStatus::Available);
        assert_eq!(ClusterStatus::parse("CREATING"), ClusterStatus::Creating);
        assert_eq!(
            ClusterStatus::parse("resizing"),
            ClusterStatus::Other("resizing".to_string())
        );
    }

    #[test]
    fn spec_debug_redacts_master_password() {
        let rendered = format!("{:?}", test_spec());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("Passw0rd"));
    }

    #[tokio::test]
    async fn provision_polls_until_available() {
        let api = MemoryClusters::with_describe_script([
            DescribeStep::Status(ClusterStatus::Creating),
            DescribeStep::Status(ClusterStatus::Creating),
            DescribeStep::Status(ClusterStatus::Available),
        ]);

        let description = provision(&api, &PollPolicy::immediate(10), &test_spec())
            .await
            .expect("cluster becomes available");

        assert!(description.status.is_available());
        assert!(description.endpoint.is_some());
        assert_eq!(api.describe_calls(), 3, "two interim polls plus the terminal one");
        assert_eq!(api.created_identifiers(), vec!["dwh-cluster".to_string()]);
    }

    #[tokio::test]
    async fn provision_accepts_a_preexisting_cluster() {
        let api = MemoryClusters::with_describe_script([DescribeStep::Status(
            ClusterStatus::Available,
        )])
        .creation_already_exists();

        let description = provision(&api, &PollPolicy::immediate(10), &test_spec())
            .await
            .expect("waits for the existing cluster");
        assert!(description.status.is_available());
        assert!(api.created_identifiers().is_empty());
    }

    #[tokio::test]
    async fn provision_times_out_when_never_available() {
        let api = MemoryClusters::with_describe_script([
            DescribeStep::Status(ClusterStatus::Creating),
            DescribeStep::Status(ClusterStatus::Creating),
            DescribeStep::Status(ClusterStatus::Creating),
        ]);

        let err = provision(&api, &PollPolicy::immediate(3), &test_spec())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn decommission_treats_absence_as_terminal() {
        let api = MemoryClusters::with_describe_script([
            DescribeStep::Status(ClusterStatus::Deleting),
            DescribeStep::NotFound,
        ]);

        decommission(&api, &PollPolicy::immediate(10), "dwh-cluster")
            .await
            .expect("absence is the terminal state");
        assert_eq!(api.deleted_identifiers(), vec!["dwh-cluster".to_string()]);
        assert_eq!(api.describe_calls(), 2);
    }

    #[tokio::test]
    async fn decommission_propagates_non_absence_failures() {
        let api = MemoryClusters::with_describe_script([
            DescribeStep::Status(ClusterStatus::Deleting),
            DescribeStep::Fail("throttled".to_string()),
        ]);

        let err = decommission(&api, &PollPolicy::immediate(10), "dwh-cluster")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cluster { .. }));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn decommission_of_absent_cluster_is_success() {
        let api = MemoryClusters::with_describe_script(std::iter::empty()).deletion_not_found();

        decommission(&api, &PollPolicy::immediate(10), "dwh-cluster")
            .await
            .expect("already gone");
        assert_eq!(api.describe_calls(), 0, "no polling after a not-found delete");
    }
}
