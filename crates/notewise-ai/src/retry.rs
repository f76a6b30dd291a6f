//! Bounded exponential-backoff retry.
//!
//! [`with_retry`] re-runs an async operation while it fails with a classified
//! error flagged retryable. Anything else (a non-retryable classification, or
//! an error that was never classified) is returned on the spot.
//!
//! With the defaults the waits are 1s then 2s: the delay after attempt `n` is
//! `initial_delay * backoff_factor^(n-1)`, and no wait follows the last attempt.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use notewise_core::{defaults, Result};

/// Suspend the current task for `duration`.
pub async fn delay(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Attempt budget and backoff curve for [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to the wait after every further failure.
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_RETRIES,
            initial_delay: Duration::from_millis(defaults::INITIAL_RETRY_DELAY_MS),
            backoff_factor: defaults::BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Default backoff curve with a custom attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_backoff_factor(mut self, backoff_factor: u32) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    /// Wait that follows the failed 1-based `attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self
            .backoff_factor
            .saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(multiplier)
    }
}

/// Run `operation` until it succeeds, fails terminally, or the budget is spent.
///
/// The last observed error is always returned; nothing is swallowed.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        subsystem = "ai",
                        component = "retry",
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt >= max_attempts || !err.is_retryable() {
                    debug!(
                        subsystem = "ai",
                        component = "retry",
                        attempt,
                        max_attempts,
                        retryable = err.is_retryable(),
                        error = %err,
                        "Giving up"
                    );
                    return Err(err);
                }

                let wait = policy.delay_for_attempt(attempt);
                warn!(
                    subsystem = "ai",
                    component = "retry",
                    attempt,
                    max_attempts,
                    delay_ms = wait.as_millis() as u64,
                    error = %err,
                    "Retryable failure, backing off"
                );
                delay(wait).await;
                attempt += 1;
            }
        }
    }
}
