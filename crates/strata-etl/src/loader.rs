//! The ETL statement sequences.
//!
//! Ordering is the load-bearing invariant here: staging tables must be
//! fully loaded before any transform runs, and within the transforms the
//! dimensions (users, song, artist, time) must be populated before the
//! fact table that references them. The sequences below encode that order;
//! callers just run them back to back.
//!
//! Each statement commits on its own. A failure aborts the sequence
//! immediately and leaves the statements before it applied.

use strata_core::{schema, sql, Result};

use crate::executor::SqlExecutor;

/// Drops every table (`if exists`, so an empty database is fine) and
/// recreates the full schema in dependency order.
///
/// # Errors
///
/// Propagates the first statement failure; earlier statements stay
/// committed.
pub async fn reset_schema(executor: &dyn SqlExecutor) -> Result<()> {
    for statement in schema::drop_table_statements() {
        executor.execute(statement).await?;
    }
    for statement in schema::create_table_statements() {
        executor.execute(statement).await?;
    }
    tracing::info!(tables = schema::TABLES.len(), "schema reset");
    Ok(())
}

/// Runs the staging `copy` statements, events then songs, sequentially.
///
/// # Errors
///
/// Propagates the first statement failure; a loaded staging table stays
/// loaded even when the other copy fails.
pub async fn load_staging(executor: &dyn SqlExecutor, copy_statements: &[String]) -> Result<()> {
    for statement in copy_statements {
        let label = statement.lines().next().unwrap_or(statement);
        tracing::info!(statement = label, "staging load started");
        executor.execute(statement).await?;
        tracing::info!(statement = label, "staging load finished");
    }
    Ok(())
}

/// Runs the five transform inserts in foreign-key order: users, song,
/// artist, time, then songplay.
///
/// # Errors
///
/// Propagates the first statement failure; earlier inserts stay committed.
pub async fn run_transforms(executor: &dyn SqlExecutor) -> Result<()> {
    for statement in sql::insert_statements() {
        let rows = executor.execute(statement).await?;
        tracing::info!(
            rows,
            statement = statement.lines().next().unwrap_or(statement),
            "transform applied"
        );
    }
    Ok(())
}

/// Row count per table, in schema order, for the post-load summary.
///
/// # Errors
///
/// Propagates the first failing count query.
pub async fn table_counts(executor: &dyn SqlExecutor) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(schema::TABLES.len());
    for table in schema::TABLES {
        let count = executor
            .query_scalar(&format!("select count(*) from {table}"))
            .await?;
        counts.push((table, count));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryExecutor;
    use strata_core::config::{AwsConfig, StorageConfig};
    use strata_core::Error;

    fn copy_statements() -> Vec<String> {
        sql::copy_statements(
            &StorageConfig {
                events_uri: "s3://bucket/log_data".to_string(),
                events_jsonpaths: "s3://bucket/log_json_path.json".to_string(),
                songs_uri: "s3://bucket/song_data".to_string(),
            },
            &AwsConfig::default(),
            "arn:aws:iam::000000000000:role/dwhRole",
        )
    }

    #[tokio::test]
    async fn reset_runs_every_drop_before_any_create() {
        let executor = MemoryExecutor::new();
        reset_schema(&executor).await.expect("reset succeeds");

        let statements = executor.statements();
        assert_eq!(statements.len(), 14);
        assert!(statements[..7]
            .iter()
            .all(|s| s.starts_with("drop table if exists")));
        assert!(statements[7..]
            .iter()
            .all(|s| s.starts_with("create table if not exists")));
        // Fact table created last.
        assert!(statements[13].contains("songplay"));
    }

    #[tokio::test]
    async fn full_load_orders_staging_before_transforms() {
        let executor = MemoryExecutor::new();
        load_staging(&executor, &copy_statements()).await.expect("staging");
        run_transforms(&executor).await.expect("transforms");

        let statements = executor.statements();
        assert_eq!(statements.len(), 7);
        assert!(statements[0].starts_with("copy staging_events"));
        assert!(statements[1].starts_with("copy staging_songs"));
        for (position, table) in ["users", "song", "artist", "time", "songplay"]
            .into_iter()
            .enumerate()
        {
            assert!(
                statements[2 + position].starts_with(&format!("insert into {table}")),
                "transform {position} should target {table}"
            );
        }
    }

    #[tokio::test]
    async fn failure_aborts_the_sequence_and_keeps_earlier_statements() {
        // Second transform (the song insert) fails.
        let executor = MemoryExecutor::new().failing_at(1);
        let err = run_transforms(&executor).await.unwrap_err();
        assert!(matches!(err, Error::Sql { .. }));

        let statements = executor.statements();
        assert_eq!(statements.len(), 1, "only the users insert committed");
        assert!(statements[0].starts_with("insert into users"));
    }

    #[tokio::test]
    async fn table_counts_cover_every_table_in_order() {
        let executor = MemoryExecutor::new().with_scalar(42);
        let counts = table_counts(&executor).await.expect("counts");

        assert_eq!(counts.len(), schema::TABLES.len());
        for ((table, count), expected) in counts.iter().zip(schema::TABLES) {
            assert_eq!(*table, expected);
            assert_eq!(*count, 42);
        }
        assert!(executor
            .statements()
            .iter()
            .all(|s| s.starts_with("select count(*) from ")));
    }
}
