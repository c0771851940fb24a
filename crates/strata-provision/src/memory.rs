//! In-memory identity and cluster fakes for testing.
//!
//! [`MemoryIdentity`] mimics the identity service's observable semantics:
//! create of an existing name reports already-exists, delete of a role with
//! attached policies fails, absence surfaces as the not-found error kind.
//! [`MemoryClusters`] replays a scripted describe sequence so lifecycle
//! tests can drive the polling state machines deterministically.
//!
//! Not suitable for anything but tests: no persistence, single process.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use strata_core::{Error, Result};

use crate::cluster::{
    ClusterApi, ClusterDescription, ClusterSpec, ClusterStatus, CreateClusterOutcome,
};
use crate::identity::{CreateRoleOutcome, IdentityApi, Role};

fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::identity("memory fake lock poisoned")
}

#[derive(Debug, Default)]
struct IdentityState {
    roles: HashMap<String, Role>,
    attachments: HashMap<String, Vec<String>>,
    create_calls: usize,
}

/// In-memory [`IdentityApi`] implementation.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    state: Mutex<IdentityState>,
}

impl MemoryIdentity {
    /// Number of create attempts seen, including already-exists ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.state.lock().expect("lock").create_calls
    }

    /// Policies currently attached to the role, in attach order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attached_policies(&self, role_name: &str) -> Vec<String> {
        self.state
            .lock()
            .expect("lock")
            .attachments
            .get(role_name)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl IdentityApi for MemoryIdentity {
    async fn create_role(&self, name: &str, _trust_policy: &str) -> Result<CreateRoleOutcome> {
        let mut state = self.state.lock().map_err(poison_err)?;
        state.create_calls += 1;
        if state.roles.contains_key(name) {
            return Ok(CreateRoleOutcome::AlreadyExists);
        }
        let role = Role {
            name: name.to_string(),
            arn: format!("arn:aws:iam::000000000000:role/{name}"),
        };
        state.roles.insert(name.to_string(), role.clone());
        Ok(CreateRoleOutcome::Created(role))
    }

    async fn get_role(&self, name: &str) -> Result<Role> {
        let state = self.state.lock().map_err(poison_err)?;
        state.roles.get(name).cloned().ok_or(Error::RoleNotFound {
            name: name.to_string(),
        })
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        let mut state = self.state.lock().map_err(poison_err)?;
        if !state.roles.contains_key(role_name) {
            return Err(Error::RoleNotFound {
                name: role_name.to_string(),
            });
        }
        let attached = state.attachments.entry(role_name.to_string()).or_default();
        if !attached.iter().any(|arn| arn == policy_arn) {
            attached.push(policy_arn.to_string());
        }
        Ok(())
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        let mut state = self.state.lock().map_err(poison_err)?;
        if !state.roles.contains_key(role_name) {
            return Err(Error::RoleNotFound {
                name: role_name.to_string(),
            });
        }
        if let Some(attached) = state.attachments.get_mut(role_name) {
            attached.retain(|arn| arn != policy_arn);
        }
        Ok(())
    }

    async fn delete_role(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().map_err(poison_err)?;
        if !state.roles.contains_key(name) {
            return Err(Error::RoleNotFound {
                name: name.to_string(),
            });
        }
        if state.attachments.get(name).is_some_and(|a| !a.is_empty()) {
            return Err(Error::identity(format!(
                "cannot delete role {name}: policies still attached"
            )));
        }
        state.roles.remove(name);
        state.attachments.remove(name);
        Ok(())
    }
}

/// One scripted response to a describe call.
#[derive(Debug, Clone)]
pub enum DescribeStep {
    /// Report the cluster with this status.
    Status(ClusterStatus),
    /// Report the cluster as absent.
    NotFound,
    /// Fail the describe call with this message.
    Fail(String),
}

#[derive(Debug, Default)]
struct ClustersState {
    script: Vec<DescribeStep>,
    describe_calls: usize,
    created: Vec<String>,
    deleted: Vec<String>,
}

/// In-memory [`ClusterApi`] implementation replaying a describe script.
///
/// Once the script is exhausted, further describes report the cluster as
/// absent.
#[derive(Debug, Default)]
pub struct MemoryClusters {
    state: Mutex<ClustersState>,
    creation_already_exists: bool,
    deletion_not_found: bool,
}

impl MemoryClusters {
    /// Creates a fake that answers describe calls from the given script.
    #[must_use]
    pub fn with_describe_script(script: impl IntoIterator<Item = DescribeStep>) -> Self {
        Self {
            state: Mutex::new(ClustersState {
                script: script.into_iter().collect(),
                ..ClustersState::default()
            }),
            creation_already_exists: false,
            deletion_not_found: false,
        }
    }

    /// Makes every create attempt report an already-existing cluster.
    #[must_use]
    pub fn creation_already_exists(mut self) -> Self {
        self.creation_already_exists = true;
        self
    }

    /// Makes every delete attempt report the cluster as absent.
    #[must_use]
    pub fn deletion_not_found(mut self) -> Self {
        self.deletion_not_found = true;
        self
    }

    /// Number of describe calls seen.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn describe_calls(&self) -> usize {
        self.state.lock().expect("lock").describe_calls
    }

    /// Identifiers of accepted create requests, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn created_identifiers(&self) -> Vec<String> {
        self.state.lock().expect("lock").created.clone()
    }

    /// Identifiers of accepted delete requests, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn deleted_identifiers(&self) -> Vec<String> {
        self.state.lock().expect("lock").deleted.clone()
    }
}

#[async_trait]
impl ClusterApi for MemoryClusters {
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<CreateClusterOutcome> {
        if self.creation_already_exists {
            return Ok(CreateClusterOutcome::AlreadyExists);
        }
        let mut state = self.state.lock().map_err(poison_err)?;
        state.created.push(spec.identifier.clone());
        Ok(CreateClusterOutcome::Created)
    }

    async fn describe_cluster(&self, identifier: &str) -> Result<ClusterDescription> {
        let mut state = self.state.lock().map_err(poison_err)?;
        state.describe_calls += 1;
        let step = if state.script.is_empty() {
            DescribeStep::NotFound
        } else {
            state.script.remove(0)
        };
        match step {
            DescribeStep::Status(status) => {
                let endpoint = status
                    .is_available()
                    .then(|| format!("{identifier}.memory.local"));
                Ok(ClusterDescription {
                    identifier: identifier.to_string(),
                    status,
                    endpoint,
                    role_arns: Vec::new(),
                })
            }
            DescribeStep::NotFound => Err(Error::ClusterNotFound {
                identifier: identifier.to_string(),
            }),
            DescribeStep::Fail(message) => Err(Error::cluster(message)),
        }
    }

    async fn delete_cluster(&self, identifier: &str) -> Result<()> {
        if self.deletion_not_found {
            return Err(Error::ClusterNotFound {
                identifier: identifier.to_string(),
            });
        }
        let mut state = self.state.lock().map_err(poison_err)?;
        state.deleted.push(identifier.to_string());
        Ok(())
    }
}
