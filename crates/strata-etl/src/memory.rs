//! In-memory statement recorder for testing.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use strata_core::{Error, Result};

use crate::executor::SqlExecutor;

fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::sql("memory executor lock poisoned")
}

#[derive(Debug, Default)]
struct ExecutorState {
    statements: Vec<String>,
}

/// [`SqlExecutor`] that records statements instead of executing them.
///
/// Optionally fails the Nth statement (0-indexed, counting successful
/// statements) to exercise mid-sequence aborts; the failing statement is
/// not recorded, mirroring a statement that never committed.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    state: Mutex<ExecutorState>,
    fail_at: Option<usize>,
    scalar: i64,
}

impl MemoryExecutor {
    /// Creates a recorder that accepts every statement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the statement at the given 0-indexed position.
    #[must_use]
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Sets the value every scalar query returns.
    #[must_use]
    pub fn with_scalar(mut self, value: i64) -> Self {
        self.scalar = value;
        self
    }

    /// Statements executed so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().expect("lock").statements.clone()
    }

    fn record(&self, sql: &str) -> Result<()> {
        let mut state = self.state.lock().map_err(poison_err)?;
        if self.fail_at == Some(state.statements.len()) {
            return Err(Error::sql(format!(
                "scripted failure at statement {}",
                state.statements.len()
            )));
        }
        state.statements.push(sql.to_string());
        Ok(())
    }
}

#[async_trait]
impl SqlExecutor for MemoryExecutor {
    async fn execute(&self, sql: &str) -> Result<u64> {
        self.record(sql)?;
        Ok(0)
    }

    async fn query_scalar(&self, sql: &str) -> Result<i64> {
        self.record(sql)?;
        Ok(self.scalar)
    }
}
