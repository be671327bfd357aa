//! Exponential backoff for rate-limited upstream calls.
//!
//! Only rate-limit failures are retried. The delay before retry `n`
//! (0-based) is `initial_delay * 2^n`, with no jitter and no cap.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Errors that can signal upstream rate limiting.
pub trait RateLimited {
    /// Whether the failure was a rate-limit response.
    fn is_rate_limited(&self) -> bool;
}

/// Retry schedule for rate-limited calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after failed attempt `attempt` (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Run `operation`, retrying while it fails with a rate-limit error.
///
/// Any other error, or a rate-limit error on the last attempt, is returned
/// unchanged.
///
/// # Errors
///
/// Returns the operation's error once retries are exhausted or for any
/// non-rate-limit failure.
pub async fn retry_rate_limited<T, E, F, Fut>(
    policy: BackoffPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RateLimited + std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match call().await {
            Err(err) if err.is_rate_limited() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
