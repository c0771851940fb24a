//! End-to-end lifecycle sequences against the in-memory fakes: the full
//! up sequence (role, policy, cluster, wait) and the full down sequence
//! (release role, delete cluster, wait for absence).

use strata_core::PollPolicy;
use strata_provision::cluster::ClusterStatus;
use strata_provision::memory::{DescribeStep, MemoryClusters, MemoryIdentity};
use strata_provision::{
    bind_policy, decommission, ensure_role, provision, release_role, trust_policy, ClusterSpec,
    DEFAULT_TRUST_PRINCIPAL,
};

use strata_core::config::ClusterType;

const POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

fn spec(role_arn: &str) -> ClusterSpec {
    ClusterSpec {
        identifier: "dwh-cluster".to_string(),
        cluster_type: ClusterType::MultiNode,
        node_type: "dc2.large".to_string(),
        number_of_nodes: 4,
        database: "dwh".to_string(),
        master_username: "dwhuser".to_string(),
        master_password: "Passw0rd".to_string(),
        iam_role_arn: role_arn.to_string(),
    }
}

#[tokio::test]
async fn cluster_up_sequence() {
    let identity = MemoryIdentity::default();
    let clusters = MemoryClusters::with_describe_script([
        DescribeStep::Status(ClusterStatus::Creating),
        DescribeStep::Status(ClusterStatus::Creating),
        DescribeStep::Status(ClusterStatus::Available),
    ]);
    let policy = PollPolicy::immediate(10);

    let trust = trust_policy(DEFAULT_TRUST_PRINCIPAL);
    let role = ensure_role(&identity, "dwhRole", &trust)
        .await
        .expect("role created");
    bind_policy(&identity, &role.name, POLICY_ARN)
        .await
        .expect("policy attached");

    let description = provision(&clusters, &policy, &spec(&role.arn))
        .await
        .expect("cluster available");

    assert!(description.status.is_available());
    assert_eq!(
        description.endpoint.as_deref(),
        Some("dwh-cluster.memory.local")
    );
    assert_eq!(identity.attached_policies("dwhRole"), vec![POLICY_ARN.to_string()]);
}

#[tokio::test]
async fn cluster_down_sequence() {
    let identity = MemoryIdentity::default();
    let clusters = MemoryClusters::with_describe_script([
        DescribeStep::Status(ClusterStatus::Deleting),
        DescribeStep::Status(ClusterStatus::Deleting),
        DescribeStep::NotFound,
    ]);
    let policy = PollPolicy::immediate(10);

    // Seed the role so the teardown has something to remove.
    let trust = trust_policy(DEFAULT_TRUST_PRINCIPAL);
    let role = ensure_role(&identity, "dwhRole", &trust)
        .await
        .expect("role created");
    bind_policy(&identity, &role.name, POLICY_ARN)
        .await
        .expect("policy attached");

    release_role(&identity, "dwhRole", POLICY_ARN)
        .await
        .expect("role released");
    decommission(&clusters, &policy, "dwh-cluster")
        .await
        .expect("cluster gone");

    assert_eq!(clusters.deleted_identifiers(), vec!["dwh-cluster".to_string()]);
    assert_eq!(clusters.describe_calls(), 3);
}

#[tokio::test]
async fn teardown_is_rerunnable() {
    // Everything is already gone: the role was never created and the
    // cluster delete reports not-found. Both steps still succeed.
    let identity = MemoryIdentity::default();
    let clusters =
        MemoryClusters::with_describe_script(std::iter::empty()).deletion_not_found();
    let policy = PollPolicy::immediate(10);

    release_role(&identity, "dwhRole", POLICY_ARN)
        .await
        .expect("absent role is fine");
    decommission(&clusters, &policy, "dwh-cluster")
        .await
        .expect("absent cluster is fine");
}
