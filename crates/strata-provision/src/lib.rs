//! # strata-provision
//!
//! Cloud control-plane operations for strata: the service role the cluster
//! assumes to read object storage, and the cluster lifecycle itself.
//!
//! Both surfaces sit behind traits ([`IdentityApi`], [`ClusterApi`]) so the
//! sequencing logic — already-exists-as-success, bounded status polling,
//! absence-as-terminal teardown — is testable against the in-memory fakes
//! in [`memory`] without an AWS account. The real adapters
//! ([`IamIdentity`], [`RedshiftClusters`]) do nothing but issue the call
//! and classify the service error.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod aws;
pub mod cluster;
pub mod identity;
pub mod memory;

pub use cluster::{
    decommission, provision, ClusterApi, ClusterDescription, ClusterSpec, ClusterStatus,
    CreateClusterOutcome, RedshiftClusters,
};
pub use identity::{
    bind_policy, ensure_role, release_role, trust_policy, CreateRoleOutcome, IamIdentity,
    IdentityApi, Role, DEFAULT_TRUST_PRINCIPAL,
};
