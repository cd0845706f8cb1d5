//! Bounded retry with exponential backoff and jitter.
//!
//! Every external network call in DataScout (planner invocation, query
//! submission, status poll, result fetch) goes through [`retry`] so transient
//! failures never surface to the user. Failures are classified through the
//! [`Retryable`] trait: rate limits, overload, timeouts and connection resets
//! are retried; invalid input and authorization failures return immediately.
//!
//! Delay before attempt `k` (k ≥ 2):
//!
//! ```text
//! min(max_delay, base_delay * 2^(k-2)) + jitter
//! ```
//!
//! where jitter is uniform in `[0, delay/2]` so concurrent callers do not
//! retry in lockstep.

use crate::error::Retryable;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

/// Immutable retry configuration, shared read-only across all invocations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles each attempt after.
    pub base_delay: Duration,

    /// Upper bound on the computed delay (before jitter).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// The backoff delay (before jitter) applied ahead of attempt `attempt`.
    /// Attempt numbering is 1-based; attempt 1 has no delay.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let exp = attempt - 2;
        let delay = self
            .base_delay
            .checked_mul(1u32.checked_shl(exp).unwrap_or(u32::MAX))
            .unwrap_or(self.max_delay);
        delay.min(self.max_delay)
    }
}

/// The outcome of a failed retry loop.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The first non-retryable failure, returned without further attempts.
    Fatal(E),

    /// All attempts failed with transient errors; carries the last one.
    Exhausted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    /// The underlying error, whichever way the loop ended.
    pub fn into_inner(self) -> E {
        match self {
            Self::Fatal(e) => e,
            Self::Exhausted { last, .. } => last,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal(e) => write!(f, "non-retryable failure: {e}"),
            Self::Exhausted { attempts, last } => {
                write!(f, "exhausted {attempts} attempts, last error: {last}")
            }
        }
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for RetryError<E> {}

/// Execute `operation` up to `policy.max_attempts` times.
///
/// `op_name` is only used for logging. Each attempt and its outcome is
/// observable via `tracing`.
pub async fn retry<T, E, F, Fut>(
    op_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_err: Option<E> = None;

    for attempt in 1..=max_attempts {
        let delay = policy.backoff_delay(attempt);
        if !delay.is_zero() {
            let jitter_ms = rand::thread_rng().gen_range(0..=delay.as_millis() as u64 / 2);
            let jitter = Duration::from_millis(jitter_ms);
            debug!(
                op = op_name,
                attempt,
                delay_ms = (delay + jitter).as_millis() as u64,
                "Backing off before retry"
            );
            tokio::time::sleep(delay + jitter).await;
        }

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(op = op_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() => {
                warn!(op = op_name, attempt, max_attempts, error = %e, "Transient failure");
                last_err = Some(e);
            }
            Err(e) => {
                warn!(op = op_name, attempt, error = %e, "Non-retryable failure");
                return Err(RetryError::Fatal(e));
            }
        }
    }

    // max_attempts >= 1 so last_err is always set here.
    Err(RetryError::Exhausted {
        attempts: max_attempts,
        last: last_err.expect("at least one attempt was made"),
    })
}
