//! SQL execution boundary.

use async_trait::async_trait;

use strata_core::config::ClusterConfig;
use strata_core::{Error, Result};

/// Executes plain SQL text against the warehouse.
///
/// Statements are not parameterized and each one commits on its own —
/// there is no surrounding transaction.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes one statement, returning the number of rows affected.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Runs a single-row, single-column query and returns the value.
    async fn query_scalar(&self, sql: &str) -> Result<i64>;
}

/// [`SqlExecutor`] over a live warehouse connection.
///
/// The connection is driven on a spawned task; dropping the executor drops
/// the client and ends the connection.
pub struct PostgresExecutor {
    client: tokio_postgres::Client,
    _connection: tokio::task::JoinHandle<()>,
}

impl PostgresExecutor {
    /// Connects to the warehouse database.
    ///
    /// The connection parameters are the cluster's database, credentials,
    /// and port from configuration, plus the resolved `host`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sql`] if the connection cannot be established.
    pub async fn connect(host: &str, cluster: &ClusterConfig) -> Result<Self> {
        let mut config = tokio_postgres::Config::new();
        config
            .host(host)
            .port(cluster.port)
            .dbname(&cluster.database)
            .user(&cluster.master_username)
            .password(&cluster.master_password);

        let (client, connection) = config
            .connect(tokio_postgres::NoTls)
            .await
            .map_err(|e| {
                Error::sql_with_source(
                    format!("connect to {host}:{} db {}", cluster.port, cluster.database),
                    e,
                )
            })?;

        let handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "warehouse connection error");
            }
        });

        Ok(Self {
            client,
            _connection: handle,
        })
    }
}

impl std::fmt::Debug for PostgresExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresExecutor").finish()
    }
}

#[async_trait]
impl SqlExecutor for PostgresExecutor {
    async fn execute(&self, sql: &str) -> Result<u64> {
        self.client
            .execute(sql, &[])
            .await
            .map_err(|e| Error::sql_with_source(statement_label(sql), e))
    }

    async fn query_scalar(&self, sql: &str) -> Result<i64> {
        let row = self
            .client
            .query_one(sql, &[])
            .await
            .map_err(|e| Error::sql_with_source(statement_label(sql), e))?;
        row.try_get(0)
            .map_err(|e| Error::sql_with_source(statement_label(sql), e))
    }
}

/// First line of a statement, for error context.
fn statement_label(sql: &str) -> String {
    sql.lines().next().unwrap_or(sql).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_label_takes_the_first_line() {
        assert_eq!(
            statement_label("insert into users (user_id)\nselect distinct userId"),
            "insert into users (user_id)"
        );
        assert_eq!(statement_label("drop table if exists time"), "drop table if exists time");
    }
}
