//! Retry manager for handling transient failures with backoff
//!
//! This module provides a retry mechanism with a configurable delay strategy
//! (exponential or fixed) and a bounded number of attempts. Attempts are
//! strictly sequential and the terminal error is always returned to the caller.

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry manager with exponential or fixed backoff
#[derive(Debug, Clone)]
pub struct RetryManager {
    config: RetryConfig,
}

impl RetryManager {
    /// Create a new RetryManager with the given configuration
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create a RetryManager with default configuration
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Execute an async operation with retry logic
    ///
    /// Equivalent to [`execute_with_observer`](Self::execute_with_observer)
    /// with a no-op observer.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.execute_with_observer(operation, |_, _| {}).await
    }

    /// Execute an async operation, reporting every retry to `on_retry`
    ///
    /// The operation runs at most `max_attempts` times. After a failed
    /// attempt `n` that still has attempts left, the manager sleeps for
    /// [`calculate_backoff(n)`](Self::calculate_backoff), then calls
    /// `on_retry(n, &err)`, then tries again. The observer is never called
    /// for the final failure; that error is returned as-is.
    pub async fn execute_with_observer<F, Fut, T, E, O>(
        &self,
        operation: F,
        mut on_retry: O,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        O: FnMut(u32, &E),
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if attempt >= max_attempts {
                        warn!(
                            attempts = attempt,
                            max_attempts,
                            error = %err,
                            "Max retry attempts exhausted"
                        );
                        return Err(err);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    debug!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Retrying after failure"
                    );

                    tokio::time::sleep(backoff).await;
                    on_retry(attempt, &err);
                    attempt += 1;
                }
            }
        }
    }

    /// Delay applied after the given failed attempt (1-based)
    ///
    /// Exponential mode: `initial_delay * 2^(attempt - 1)`.
    /// Fixed mode: `initial_delay` every time.
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let base = self.config.initial_delay_ms;
        if !self.config.exponential {
            return Duration::from_millis(base);
        }

        let exponent = attempt.saturating_sub(1).min(32);
        Duration::from_millis(base.saturating_mul(1u64 << exponent))
    }

    /// Get the retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn manager(max_attempts: u32, exponential: bool) -> RetryManager {
        RetryManager::new(RetryConfig {
            max_attempts,
            initial_delay_ms: 2000,
            exponential,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let manager = manager(3, true);
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result: Result<&str, SyncError> = manager
            .execute(|| {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Ok("success")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success_reports_two_retries() {
        let manager = manager(3, true);
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();
        let mut observed = Vec::new();

        let result: Result<&str, SyncError> = manager
            .execute_with_observer(
                || {
                    let count = attempt_count_clone.clone();
                    async move {
                        if count.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err(SyncError::NetworkTimeout)
                        } else {
                            Ok("success")
                        }
                    }
                },
                |attempt, err: &SyncError| observed.push((attempt, err.clone())),
            )
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
        assert_eq!(
            observed,
            vec![(1, SyncError::NetworkTimeout), (2, SyncError::NetworkTimeout)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_attempts_fail_propagates_last_error() {
        let manager = manager(3, true);
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();
        let mut observer_calls = 0;

        let result: Result<(), SyncError> = manager
            .execute_with_observer(
                || {
                    let count = attempt_count_clone.clone();
                    async move {
                        let n = count.fetch_add(1, Ordering::SeqCst);
                        Err(SyncError::ServerError(500 + n as u16))
                    }
                },
                |_, _| observer_calls += 1,
            )
            .await;

        assert_eq!(result.unwrap_err(), SyncError::ServerError(502));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
        // No observer call after the terminal attempt
        assert_eq!(observer_calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_delays_elapse_between_attempts() {
        let manager = manager(3, true);
        let start = tokio::time::Instant::now();

        let result: Result<(), SyncError> = manager
            .execute(|| async { Err(SyncError::NetworkTimeout) })
            .await;

        assert!(result.is_err());
        // 2000ms after attempt 1, 4000ms after attempt 2
        assert_eq!(start.elapsed(), Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delays_elapse_between_attempts() {
        let manager = manager(3, false);
        let start = tokio::time::Instant::now();

        let result: Result<(), SyncError> = manager
            .execute(|| async { Err(SyncError::NetworkTimeout) })
            .await;

        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::from_millis(4000));
    }

    #[test]
    fn test_exponential_backoff_calculation() {
        let manager = manager(5, true);

        assert_eq!(manager.calculate_backoff(1), Duration::from_millis(2000));
        assert_eq!(manager.calculate_backoff(2), Duration::from_millis(4000));
        assert_eq!(manager.calculate_backoff(3), Duration::from_millis(8000));
        assert_eq!(manager.calculate_backoff(4), Duration::from_millis(16000));
    }

    #[test]
    fn test_fixed_backoff_calculation() {
        let manager = manager(5, false);

        assert_eq!(manager.calculate_backoff(1), Duration::from_millis(2000));
        assert_eq!(manager.calculate_backoff(4), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        let manager = RetryManager::new(RetryConfig {
            max_attempts: 100,
            initial_delay_ms: u64::MAX / 2,
            exponential: true,
        });

        assert_eq!(manager.calculate_backoff(80), Duration::from_millis(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_retries() {
        let manager = manager(1, true);
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<(), SyncError> = manager
            .execute(|| {
                let count = attempt_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err(SyncError::ConnectionRefused)
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), SyncError::ConnectionRefused);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_configuration() {
        let manager = RetryManager::with_defaults();
        let config = manager.config();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay_ms, 2000);
        assert!(config.exponential);
    }
}
