//! Bounded retry with a fixed delay
//!
//! Every failure is treated as transient: network errors and validation
//! failures are retried alike until the attempt budget is spent.
//!
//! # Example
//!
//! ```no_run
//! use paper_trawl::download::{retry_with_delay, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let policy = RetryPolicy::new(3, Duration::from_secs(2));
//! let value = retry_with_delay(&policy, |attempt| async move {
//!     if attempt < 2 { Err(format!("attempt {} failed", attempt)) } else { Ok(attempt) }
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least 1
    pub max_attempts: u32,

    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are used up
///
/// The operation receives the 1-based attempt number. The last error is
/// returned when every attempt failed.
pub async fn retry_with_delay<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::debug!(error = %e, attempts = attempt, "All attempts exhausted");
                return Err(e);
            }
        }
    }
}
