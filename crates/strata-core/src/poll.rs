//! Bounded status polling.
//!
//! Cluster creation and deletion are observed, not pushed: the service owns
//! the authoritative status field and the operator repeatedly asks for it.
//! [`wait_for`] is the explicit state machine for that pattern — each poll
//! either reaches the terminal state and returns its value, or observes an
//! interim status and sleeps. Attempts are bounded and the interval backs
//! off geometrically up to a cap, so a cluster that never converges yields
//! [`Error::Timeout`] instead of blocking forever.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Backoff and attempt budget for a polled wait.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Interval before the second poll.
    pub initial_interval: Duration,
    /// Geometric growth factor applied per attempt.
    pub multiplier: f64,
    /// Upper bound on the interval between polls.
    pub max_interval: Duration,
    /// Total polls before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(10),
            multiplier: 1.5,
            max_interval: Duration::from_secs(60),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    /// A policy that never sleeps, for tests.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            initial_interval: Duration::ZERO,
            multiplier: 1.0,
            max_interval: Duration::ZERO,
            max_attempts,
        }
    }

    /// Returns the sleep interval after the given 1-indexed attempt.
    #[must_use]
    pub fn interval_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_interval.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_interval.as_secs_f64()))
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState<T> {
    /// The terminal state was reached; the wait returns this value.
    Ready(T),
    /// An interim status was observed; the wait sleeps and polls again.
    Pending(String),
}

/// Polls `check` until it reports [`PollState::Ready`].
///
/// Each interim status is emitted once via `tracing::info!` so the operator
/// can watch the resource converge. `check` receives the 1-indexed attempt
/// number.
///
/// # Errors
///
/// Propagates any error from `check` unchanged, and returns
/// [`Error::Timeout`] once `policy.max_attempts` polls have all come back
/// pending.
pub async fn wait_for<T, F, Fut>(policy: &PollPolicy, operation: &str, mut check: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollState<T>>>,
{
    for attempt in 1..=policy.max_attempts {
        match check(attempt).await? {
            PollState::Ready(value) => return Ok(value),
            PollState::Pending(status) => {
                tracing::info!(operation, attempt, status = %status, "still waiting");
                tokio::time::sleep(policy.interval_after(attempt)).await;
            }
        }
    }
    Err(Error::timeout(operation, policy.max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn backoff_grows_and_caps() {
        let policy = PollPolicy {
            initial_interval: Duration::from_secs(10),
            multiplier: 2.0,
            max_interval: Duration::from_secs(25),
            max_attempts: 10,
        };
        assert_eq!(policy.interval_after(1), Duration::from_secs(10));
        assert_eq!(policy.interval_after(2), Duration::from_secs(20));
        // 40s exceeds the cap
        assert_eq!(policy.interval_after(3), Duration::from_secs(25));
        assert_eq!(policy.interval_after(9), Duration::from_secs(25));
    }

    #[test]
    fn default_policy_starts_at_ten_seconds() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval_after(1), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn two_interim_statuses_then_ready() {
        let statuses = RefCell::new(vec!["creating", "creating", "available"]);
        let observed = RefCell::new(Vec::new());

        let result = wait_for(&PollPolicy::immediate(10), "cluster available", |_| {
            let status = statuses.borrow_mut().remove(0);
            if status == "available" {
                std::future::ready(Ok(PollState::Ready(status)))
            } else {
                observed.borrow_mut().push(status.to_string());
                std::future::ready(Ok(PollState::Pending(status.to_string())))
            }
        })
        .await
        .expect("reaches ready");

        assert_eq!(result, "available");
        // Exactly the two interim observations, none for the terminal poll.
        assert_eq!(*observed.borrow(), ["creating", "creating"]);
    }

    #[tokio::test]
    async fn exhausted_attempts_time_out() {
        let polls = RefCell::new(0u32);
        let err = wait_for::<(), _, _>(&PollPolicy::immediate(4), "cluster gone", |_| {
            *polls.borrow_mut() += 1;
            std::future::ready(Ok(PollState::Pending("deleting".to_string())))
        })
        .await
        .unwrap_err();

        assert_eq!(*polls.borrow(), 4);
        assert!(matches!(
            err,
            Error::Timeout {
                attempts: 4,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn check_errors_propagate() {
        let err = wait_for::<(), _, _>(&PollPolicy::immediate(3), "cluster available", |_| {
            std::future::ready(Err(Error::cluster("describe failed")))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Cluster { .. }));
    }
}
