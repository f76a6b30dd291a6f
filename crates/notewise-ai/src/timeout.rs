//! Deadline guard for provider calls.
//!
//! The guarded operation runs as its own task. When the deadline fires first
//! the caller gets a retryable `timeout` error and the task is detached: it
//! keeps running to completion and its result is dropped.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use notewise_core::{AiError, Error, Result};

/// Message carried by the error produced when the deadline wins.
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Race `operation` against `timeout`.
pub async fn with_timeout<T, Fut>(operation: Fut, timeout: Duration) -> Result<T>
where
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(operation);

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(Error::Internal(format!(
            "Request task failed: {}",
            join_err
        ))),
        Err(_) => {
            // Dropping the JoinHandle detaches the task rather than aborting it.
            warn!(
                subsystem = "ai",
                component = "timeout",
                timeout_ms = timeout.as_millis() as u64,
                "Deadline elapsed, abandoning in-flight request"
            );
            Err(AiError::timeout(TIMEOUT_MESSAGE).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notewise_core::ErrorKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    async fn finish_after(ms: u64, value: &'static str) -> Result<&'static str> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(value)
    }

    async fn fail_with(message: &'static str) -> Result<()> {
        Err(Error::Simulated(message.to_string()))
    }

    async fn explode() -> Result<()> {
        panic!("provider task panicked")
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_operation_returns_value() {
        let result = with_timeout(finish_after(50, "fast"), Duration::from_millis(100)).await;
        assert_eq!(result.unwrap(), "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_operation_times_out() {
        let result = with_timeout(finish_after(500, "slow"), Duration::from_millis(100)).await;

        let err = result.unwrap_err();
        let ai = err.as_ai().expect("timeout should be classified");
        assert_eq!(ai.kind, ErrorKind::Timeout);
        assert!(ai.retryable);
        assert_eq!(ai.message, TIMEOUT_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_error_passes_through() {
        let result = with_timeout(fail_with("upstream broke"), Duration::from_millis(100)).await;

        assert!(matches!(result, Err(Error::Simulated(msg)) if msg == "upstream broke"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_operation_is_orphaned_not_aborted() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result = with_timeout(
            async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<(), Error>(())
            },
            Duration::from_millis(100),
        )
        .await;
        assert!(result.is_err());
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(finished.load(Ordering::SeqCst), "detached task should run to completion");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_operation_is_internal_error() {
        let result = with_timeout(explode(), Duration::from_millis(100)).await;

        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
