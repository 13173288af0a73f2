// src/retry.rs
//! Bounded retry with exponential backoff, shared by the LLM client and the
//! posting detail fetches. Also home of the politeness pause between page loads.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }
}

/// Outcome of a retried operation that never succeeded.
#[derive(Debug)]
pub struct GaveUp<E> {
    pub attempts: u32,
    pub last: E,
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, GaveUp<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt > policy.max_retries || !is_retryable(&e) {
                    return Err(GaveUp {
                        attempts: attempt,
                        last: e,
                    });
                }
                let delay = backoff_delay(policy.initial_backoff, policy.max_backoff, attempt - 1);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "{} failed, retrying",
                    what
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// `initial * 2^exponent`, capped at `max`, plus up to 25 % jitter.
pub fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    Duration::from_millis(capped_ms.saturating_add(pseudo_jitter_ms(jitter_cap)))
}

/// Sleep for `base` plus up to half of it again, so page loads do not land
/// on a fixed cadence.
pub async fn polite_pause(base: Duration) {
    if base.is_zero() {
        return;
    }
    let base_ms = base.as_millis() as u64;
    let extra = pseudo_jitter_ms(std::cmp::max(1, base_ms / 2));
    tokio::time::sleep(Duration::from_millis(base_ms + extra)).await;
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let nanos = now.subsec_nanos() as u64;
    nanos % (max_inclusive + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_backoff_grows_and_caps() {
        let initial = Duration::from_millis(1000);
        let max = Duration::from_millis(30_000);

        let first = backoff_delay(initial, max, 0);
        assert!(first >= Duration::from_millis(1000) && first <= Duration::from_millis(1250));

        let third = backoff_delay(initial, max, 2);
        assert!(third >= Duration::from_millis(4000) && third <= Duration::from_millis(5000));

        let huge = backoff_delay(initial, max, 200);
        assert!(huge >= max && huge <= Duration::from_millis(37_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = Cell::new(0u32);
        let result: Result<&str, GaveUp<String>> = retry_with_backoff(
            RetryPolicy::with_max_retries(3),
            "flaky op",
            |_| true,
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(format!("failure {}", n))
                    } else {
                        Ok("done")
                    }
                }
            },
        )
        .await;

        assert_eq!(result.expect("eventually succeeds"), "done");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_is_bounded() {
        let calls = Cell::new(0u32);
        let result: Result<(), GaveUp<String>> = retry_with_backoff(
            RetryPolicy::with_max_retries(3),
            "always failing op",
            |_| true,
            || {
                calls.set(calls.get() + 1);
                async { Err("nope".to_string()) }
            },
        )
        .await;

        let gave_up = result.unwrap_err();
        assert_eq!(gave_up.attempts, 4);
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_stops_immediately() {
        let calls = Cell::new(0u32);
        let result: Result<(), GaveUp<String>> = retry_with_backoff(
            RetryPolicy::with_max_retries(3),
            "fatal op",
            |_| false,
            || {
                calls.set(calls.get() + 1);
                async { Err("bad request".to_string()) }
            },
        )
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.get(), 1);
    }
}
