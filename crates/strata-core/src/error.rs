//! Error types and result alias shared across the strata crates.
//!
//! Every fallible operation returns an explicit [`Result`]; callers always
//! see success or a classified failure, never a logged-and-swallowed side
//! effect. Absence of a resource is its own kind ([`Error::ClusterNotFound`],
//! [`Error::RoleNotFound`]) because teardown treats it as a terminal success
//! while everything else treats it as a failure.

/// The result type used throughout strata.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in strata operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The deployment configuration is missing, unreadable, or invalid.
    #[error("configuration error: {message}")]
    Config {
        /// Description of what is wrong with the configuration.
        message: String,
    },

    /// An identity (role/policy) operation failed.
    #[error("identity error: {message}")]
    Identity {
        /// Description of the failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A cluster lifecycle operation failed.
    #[error("cluster error: {message}")]
    Cluster {
        /// Description of the failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The cluster does not exist.
    ///
    /// During decommissioning this is the desired terminal state, not a
    /// failure; [`Error::is_not_found`] lets callers tell it apart from
    /// every other error kind.
    #[error("cluster not found: {identifier}")]
    ClusterNotFound {
        /// The cluster identifier that was looked up.
        identifier: String,
    },

    /// The role does not exist.
    #[error("role not found: {name}")]
    RoleNotFound {
        /// The role name that was looked up.
        name: String,
    },

    /// A SQL statement failed against the warehouse.
    #[error("sql error: {message}")]
    Sql {
        /// Description of the failing statement.
        message: String,
        /// The underlying database error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A polled operation did not reach its terminal state within the
    /// configured attempt budget.
    #[error("timed out waiting for {operation} after {attempts} attempts")]
    Timeout {
        /// The operation that was being waited on.
        operation: String,
        /// How many polls were made before giving up.
        attempts: u32,
    },
}

impl Error {
    /// Creates a configuration error with the given message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an identity error with the given message.
    #[must_use]
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an identity error with a source cause.
    #[must_use]
    pub fn identity_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Identity {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a cluster error with the given message.
    #[must_use]
    pub fn cluster(message: impl Into<String>) -> Self {
        Self::Cluster {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a cluster error with a source cause.
    #[must_use]
    pub fn cluster_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Cluster {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a SQL error with the given message.
    #[must_use]
    pub fn sql(message: impl Into<String>) -> Self {
        Self::Sql {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a SQL error with a source cause.
    #[must_use]
    pub fn sql_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Sql {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a timeout error for the given operation.
    #[must_use]
    pub fn timeout(operation: impl Into<String>, attempts: u32) -> Self {
        Self::Timeout {
            operation: operation.into(),
            attempts,
        }
    }

    /// Returns true if this error signals that the looked-up resource does
    /// not exist (as opposed to any other failure).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ClusterNotFound { .. } | Self::RoleNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        assert!(Error::ClusterNotFound {
            identifier: "dwh".to_string()
        }
        .is_not_found());
        assert!(Error::RoleNotFound {
            name: "dwh-role".to_string()
        }
        .is_not_found());
        assert!(!Error::cluster("describe failed").is_not_found());
        assert!(!Error::timeout("cluster available", 60).is_not_found());
    }

    #[test]
    fn display_includes_context() {
        let err = Error::timeout("cluster available", 3);
        assert_eq!(
            err.to_string(),
            "timed out waiting for cluster available after 3 attempts"
        );
    }
}
