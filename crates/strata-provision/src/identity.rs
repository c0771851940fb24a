//! Service role management.
//!
//! The warehouse cluster reads object storage by assuming a service role
//! with a read-only policy attached. [`ensure_role`] is idempotent-by-name:
//! an already-existing role is looked up and returned with its stable ARN
//! rather than treated as a failure. Teardown is symmetric —
//! [`release_role`] treats a role that is already gone as success, because
//! absence is the desired terminal state.

use async_trait::async_trait;
use aws_sdk_iam::error::SdkError;

use strata_core::{Error, Result};

/// Service principal allowed to assume the warehouse role.
pub const DEFAULT_TRUST_PRINCIPAL: &str = "redshift.amazonaws.com";

/// A service role resolved to its stable ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Role name, unique per account.
    pub name: String,
    /// ARN assigned by the identity service.
    pub arn: String,
}

/// Outcome of a role creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRoleOutcome {
    /// The role was created.
    Created(Role),
    /// A role of that name already exists; look it up instead.
    AlreadyExists,
}

/// Builds the assume-role trust document for the given service principal.
#[must_use]
pub fn trust_policy(service_principal: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": service_principal }
        }]
    })
    .to_string()
}

/// Identity service surface used by the orchestrators.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Attempts to create a role with the given trust document.
    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<CreateRoleOutcome>;

    /// Fetches an existing role.
    ///
    /// Absence surfaces as [`Error::RoleNotFound`].
    async fn get_role(&self, name: &str) -> Result<Role>;

    /// Attaches a managed policy to the role. Reattaching an
    /// already-attached policy is not an error.
    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    /// Detaches a managed policy from the role.
    ///
    /// Absence of the role surfaces as [`Error::RoleNotFound`].
    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    /// Deletes the role. All policies must be detached first.
    ///
    /// Absence surfaces as [`Error::RoleNotFound`].
    async fn delete_role(&self, name: &str) -> Result<()>;
}

/// Creates the role, or returns the existing one with its stable ARN.
///
/// # Errors
///
/// Any failure other than "a role of that name already exists" propagates.
pub async fn ensure_role(
    api: &dyn IdentityApi,
    name: &str,
    trust_policy: &str,
) -> Result<Role> {
    match api.create_role(name, trust_policy).await? {
        CreateRoleOutcome::Created(role) => {
            tracing::info!(role = %role.name, arn = %role.arn, "created service role");
            Ok(role)
        }
        CreateRoleOutcome::AlreadyExists => {
            let role = api.get_role(name).await?;
            tracing::info!(role = %role.name, arn = %role.arn, "service role already exists");
            Ok(role)
        }
    }
}

/// Attaches the access policy to the role.
///
/// # Errors
///
/// Propagates any identity-service failure.
pub async fn bind_policy(api: &dyn IdentityApi, role_name: &str, policy_arn: &str) -> Result<()> {
    api.attach_role_policy(role_name, policy_arn).await?;
    tracing::info!(role = role_name, policy = policy_arn, "attached access policy");
    Ok(())
}

/// Detaches the policy and deletes the role.
///
/// A role (or attachment) that is already gone counts as success; any
/// other failure propagates.
///
/// # Errors
///
/// Propagates identity-service failures other than absence.
pub async fn release_role(api: &dyn IdentityApi, role_name: &str, policy_arn: &str) -> Result<()> {
    match api.detach_role_policy(role_name, policy_arn).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::debug!(role = role_name, "role already absent, nothing to detach");
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    match api.delete_role(role_name).await {
        Ok(()) => {
            tracing::info!(role = role_name, "deleted service role");
            Ok(())
        }
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Identity adapter over the IAM service.
pub struct IamIdentity {
    client: aws_sdk_iam::Client,
}

impl IamIdentity {
    /// Creates the adapter from the shared SDK configuration.
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_iam::Client::new(sdk_config),
        }
    }
}

impl std::fmt::Debug for IamIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamIdentity").finish()
    }
}

#[async_trait]
impl IdentityApi for IamIdentity {
    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<CreateRoleOutcome> {
        let result = self
            .client
            .create_role()
            .path("/")
            .role_name(name)
            .description("Allows the warehouse cluster to read object storage on the operator's behalf.")
            .assume_role_policy_document(trust_policy)
            .send()
            .await;
        match result {
            Ok(output) => {
                let role = output
                    .role()
                    .ok_or_else(|| Error::identity("create_role returned no role"))?;
                Ok(CreateRoleOutcome::Created(Role {
                    name: role.role_name().to_string(),
                    arn: role.arn().to_string(),
                }))
            }
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_entity_already_exists_exception() {
                        return Ok(CreateRoleOutcome::AlreadyExists);
                    }
                }
                Err(Error::identity_with_source(
                    format!("create role {name}"),
                    err,
                ))
            }
        }
    }

    async fn get_role(&self, name: &str) -> Result<Role> {
        match self.client.get_role().role_name(name).send().await {
            Ok(output) => {
                let role = output
                    .role()
                    .ok_or_else(|| Error::identity("get_role returned no role"))?;
                Ok(Role {
                    name: role.role_name().to_string(),
                    arn: role.arn().to_string(),
                })
            }
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_no_such_entity_exception() {
                        return Err(Error::RoleNotFound {
                            name: name.to_string(),
                        });
                    }
                }
                Err(Error::identity_with_source(format!("get role {name}"), err))
            }
        }
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|err| {
                Error::identity_with_source(
                    format!("attach policy {policy_arn} to role {role_name}"),
                    err,
                )
            })?;
        Ok(())
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        match self
            .client
            .detach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_no_such_entity_exception() {
                        return Err(Error::RoleNotFound {
                            name: role_name.to_string(),
                        });
                    }
                }
                Err(Error::identity_with_source(
                    format!("detach policy {policy_arn} from role {role_name}"),
                    err,
                ))
            }
        }
    }

    async fn delete_role(&self, name: &str) -> Result<()> {
        match self.client.delete_role().role_name(name).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_no_such_entity_exception() {
                        return Err(Error::RoleNotFound {
                            name: name.to_string(),
                        });
                    }
                }
                Err(Error::identity_with_source(format!("delete role {name}"), err))
            }
        }
    }
}
