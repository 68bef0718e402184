//! Bounded retry with exponential backoff for external-service calls.
//!
//! Every client that talks to a rate-limited external service (embedding,
//! completion) takes a [`RetryPolicy`] instead of hard-coding retry loops at
//! call sites. Only errors classified transient by
//! [`RagError::is_transient`] are retried; everything else propagates
//! immediately.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{RagError, Result};

/// Default initial delay between retries (100ms).
const DEFAULT_INITIAL_DELAY_MS: u64 = 100;

/// Default maximum delay between retries (30 seconds).
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Default number of attempts (1 initial + 2 retries).
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// An exponential-backoff retry policy for transient failures.
///
/// The delay before retry `n` is `initial_delay * multiplier^(n-1)`, capped
/// at `max_delay`. When the attempt budget is exhausted the last transient
/// error is converted into [`RagError::ServiceUnavailable`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with an explicit attempt budget and delay bounds.
    ///
    /// `max_attempts` counts the initial attempt; a value of 0 is treated
    /// as 1 (no retries).
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), initial_delay, max_delay, multiplier: 2.0 }
    }

    /// A policy that never retries. Useful in tests.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// The delay to sleep before the attempt following `attempt` (1-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails with a non-transient error,
    /// or the attempt budget runs out.
    ///
    /// `service` names the external service for logs and for the
    /// [`RagError::ServiceUnavailable`] produced on exhaustion.
    pub async fn run<T, F, Fut>(&self, service: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => {
                    debug!(service, error = %e, "non-retryable error, failing immediately");
                    return Err(e);
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        warn!(service, attempts = attempt, error = %e, "retry budget exhausted");
                        return Err(RagError::ServiceUnavailable {
                            service: service.to_string(),
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    debug!(
                        service,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn transient() -> RagError {
        RagError::Transient { service: "test".to_string(), message: "boom".to_string() }
    }

    #[tokio::test]
    async fn succeeds_first_try_without_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);

        let counter = calls.clone();
        let result = policy
            .run("test", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);

        let counter = calls.clone();
        let result = policy
            .run("test", move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(transient())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_converts_to_service_unavailable() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);

        let counter = calls.clone();
        let result: Result<()> = policy
            .run("embedding", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(transient())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            RagError::ServiceUnavailable { service, attempts, .. } => {
                assert_eq!(service, "embedding");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected ServiceUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(5, Duration::ZERO, Duration::ZERO);

        let counter = calls.clone();
        let result: Result<()> = policy
            .run("embedding", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(RagError::EmbeddingDimension {
                        provider: "test".to_string(),
                        expected: 8,
                        actual: 4,
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), RagError::EmbeddingDimension { .. }));
    }

    #[test]
    fn delay_grows_exponentially_and_is_capped() {
        let policy =
            RetryPolicy::new(10, Duration::from_millis(100), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(8), Duration::from_millis(1_000));
    }
}
