//! Poll a remote operation until it reaches a terminal state.
//!
//! This is a *status* poll, not a *failure* retry: the interval backs off
//! lightly to avoid hammering the service, independent of the error backoff
//! in [`crate::retry`]. The loop is bounded by `max_wait`; hitting the bound
//! yields [`PollOutcome::TimedOut`] so the caller can clean up (e.g.
//! best-effort cancel a remote query).

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Immutable polling configuration.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Interval before the first status check.
    pub initial_interval: Duration,

    /// Ceiling for the growing interval.
    pub max_interval: Duration,

    /// Total wall-clock budget for the poll loop.
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(400),
            max_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(60),
        }
    }
}

/// How the poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<S> {
    /// A terminal state was observed.
    Terminal(S),

    /// `max_wait` elapsed before any terminal state. Carries the seconds
    /// actually waited.
    TimedOut { waited_secs: u64 },
}

/// Repeatedly invoke `fetch` until `is_terminal` says the observed state is
/// final, or until `policy.max_wait` elapses.
///
/// The interval grows by 1.5x per check, capped at `max_interval`. Errors
/// from `fetch` propagate unchanged — wrap `fetch` in the retry executor if
/// individual status checks should absorb transient failures.
pub async fn poll_until<S, E, F, Fut, P>(
    policy: &PollPolicy,
    mut fetch: F,
    is_terminal: P,
) -> std::result::Result<PollOutcome<S>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<S, E>>,
    P: Fn(&S) -> bool,
{
    let started = Instant::now();
    let deadline = started + policy.max_wait;
    let mut interval = policy.initial_interval;
    let mut checks: u32 = 0;

    loop {
        let state = fetch().await?;
        checks += 1;
        if is_terminal(&state) {
            debug!(checks, elapsed_ms = started.elapsed().as_millis() as u64, "Poll terminal");
            return Ok(PollOutcome::Terminal(state));
        }

        let now = Instant::now();
        if now >= deadline {
            let waited_secs = started.elapsed().as_secs();
            debug!(checks, waited_secs, "Poll budget exhausted");
            return Ok(PollOutcome::TimedOut { waited_secs });
        }

        // Never sleep past the deadline: shorten the last interval so the
        // final check lands at max_wait instead of giving up early.
        tokio::time::sleep(interval.min(deadline - now)).await;
        interval = (interval.mul_f64(1.5)).min(policy.max_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            max_wait: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn terminal_on_first_check() {
        let outcome: Result<_, ()> =
            poll_until(&fast_policy(), || async { Ok("SUCCEEDED") }, |s| {
                *s == "SUCCEEDED"
            })
            .await;
        assert_eq!(outcome.unwrap(), PollOutcome::Terminal("SUCCEEDED"));
    }

    #[tokio::test]
    async fn polls_until_terminal() {
        let checks = Arc::new(AtomicU32::new(0));
        let checks2 = checks.clone();

        let outcome: Result<_, ()> = poll_until(
            &fast_policy(),
            move || {
                let checks = checks2.clone();
                async move {
                    let n = checks.fetch_add(1, Ordering::SeqCst);
                    Ok(if n < 3 { "RUNNING" } else { "SUCCEEDED" })
                }
            },
            |s| *s == "SUCCEEDED",
        )
        .await;

        assert_eq!(outcome.unwrap(), PollOutcome::Terminal("SUCCEEDED"));
        assert_eq!(checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn times_out_when_never_terminal() {
        let outcome: Result<PollOutcome<&str>, ()> =
            poll_until(&fast_policy(), || async { Ok("RUNNING") }, |s| {
                *s == "SUCCEEDED"
            })
            .await;
        assert!(matches!(outcome.unwrap(), PollOutcome::TimedOut { .. }));
    }

    #[tokio::test]
    async fn final_check_lands_at_the_deadline() {
        // With a cap far above the budget, the growing interval would soon
        // overshoot the deadline. The last sleep must be shortened so a
        // state that turns terminal late in the budget is still observed.
        let policy = PollPolicy {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_secs(1),
            max_wait: Duration::from_millis(100),
        };
        let started = std::time::Instant::now();

        let outcome: Result<_, ()> = poll_until(
            &policy,
            move || async move {
                Ok(if started.elapsed() >= Duration::from_millis(80) {
                    "SUCCEEDED"
                } else {
                    "RUNNING"
                })
            },
            |s| *s == "SUCCEEDED",
        )
        .await;

        assert_eq!(outcome.unwrap(), PollOutcome::Terminal("SUCCEEDED"));
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let outcome: Result<PollOutcome<&str>, &str> =
            poll_until(&fast_policy(), || async { Err("boom") }, |_| true).await;
        assert_eq!(outcome.unwrap_err(), "boom");
    }
}
