use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::domain::error::StoreError;

/// Per-call timeout and retry policy for remote store requests
///
/// Every attempt is bounded by `call_timeout`; an elapsed timeout becomes
/// `StoreError::Timeout` and is not retried. Transient errors (429, 5xx,
/// network) are retried with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first call
    max_retries: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
    /// Upper bound for a single attempt
    call_timeout: Duration,
}

impl RetryPolicy {
    /// Policy with exponential backoff between `initial_backoff_ms` and `max_backoff_ms`
    pub fn new(
        max_retries: u32,
        initial_backoff_ms: u64,
        max_backoff_ms: u64,
        call_timeout: Duration,
    ) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
            call_timeout,
        }
    }

    /// Policy that makes exactly one attempt
    pub fn no_retry(call_timeout: Duration) -> Self {
        Self::new(0, 1, 1, call_timeout)
    }

    /// Upper bound for a single attempt
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Execute an operation with timeout and exponential backoff retry
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0;

        loop {
            let outcome = match timeout(self.call_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout),
            };

            match outcome {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Remote call succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if self.should_retry(&err, attempt) {
                        let backoff = self.calculate_backoff(attempt);
                        warn!(
                            attempt = attempt + 1,
                            error = %err,
                            backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                            "transient remote store error, retrying"
                        );
                        sleep(backoff).await;
                        attempt += 1;
                    } else {
                        if attempt > 0 {
                            warn!("Remote call failed after {} attempts: {}", attempt + 1, err);
                        }
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Formula: min(initial_backoff * 2^attempt, max_backoff)
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &StoreError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl Default for RetryPolicy {
    /// 3 retries, 500ms initial backoff, 8s max backoff, 30s per call
    fn default() -> Self {
        Self::new(3, 500, 8_000, Duration::from_secs(30))
    }
}
