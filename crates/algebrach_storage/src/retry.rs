//! Bounded retry with exponential backoff for store calls.

use algebrach_error::{RetryableError, StorageResult};
use derive_getters::Getters;
use derive_setters::Setters;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::ExponentialBackoff;
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

/// How often and how patiently a store call is retried.
///
/// The default allows 3 attempts, waiting 2s and then 4s between them, with
/// every delay capped at 10s. Only errors whose kind is retryable trigger
/// another attempt.
///
/// # Examples
///
/// ```
/// use algebrach_storage::RetryPolicy;
/// use std::time::Duration;
///
/// let delays: Vec<Duration> = RetryPolicy::default().delays().collect();
/// assert_eq!(delays, vec![Duration::from_secs(2), Duration::from_secs(4)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    attempts: usize,
    /// Delay before the second attempt; doubles for each later one
    initial_delay: Duration,
    /// Upper bound on any single delay
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delays slept between consecutive attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        // base 2 doubles every step; the factor scales the first step to initial_delay
        let half_initial_ms = (self.initial_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(half_initial_ms)
            .max_delay(self.max_delay)
            .take(self.attempts.saturating_sub(1))
    }

    /// Run `action` until it succeeds, fails permanently or attempts run out.
    ///
    /// The error of the last attempt is returned as is.
    pub async fn run<F, Fut, T>(&self, operation: &'static str, mut action: F) -> StorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        Retry::spawn(self.delays(), || {
            let attempt = action();
            async move {
                match attempt.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() => {
                        warn!(operation, error = %e, "Transient store error, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        warn!(operation, error = %e, "Permanent store error, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebrach_error::{StorageError, StorageErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy::default()
            .with_initial_delay(Duration::from_millis(2))
            .with_max_delay(Duration::from_millis(10))
    }

    #[test]
    fn test_delays_are_capped() {
        let policy = RetryPolicy::default().with_attempts(6);
        let delays: Vec<u64> = policy.delays().map(|d| d.as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 10, 10]);
    }

    #[test]
    fn test_single_attempt_has_no_delays() {
        assert_eq!(RetryPolicy::default().with_attempts(1).delays().count(), 0);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: StorageResult<()> = fast()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(StorageError::new(StorageErrorKind::RemoteRejected(
                        "422".to_string(),
                    )))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_last_error_surfaces_after_attempts_run_out() {
        let calls = AtomicUsize::new(0);
        let result: StorageResult<()> = fast()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(StorageError::new(StorageErrorKind::Timeout)) }
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), &StorageErrorKind::Timeout);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
