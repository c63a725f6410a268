//! Retry utilities for flaky HTTP APIs.
//!
//! Transient failures (429, network errors, 5xx) are retried with exponential
//! backoff and jitter. Everything else is propagated on the first failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

/// An error that can tell whether retrying the request may succeed.
pub trait Transient: Display {
    /// `true` if the condition may clear after a backoff delay.
    fn is_retriable(&self) -> bool;

    /// Server-requested wait from a `Retry-After` header, if any.
    fn retry_after_secs(&self) -> Option<u64> {
        None
    }
}

/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`]: timeouts and connection failures.
/// - [`ScraperError::Api`] with a 5xx status.
///
/// A finished-but-failed actor run, a bad token or a malformed body will
/// not change on retry and is returned immediately.
impl Transient for ScraperError {
    fn is_retriable(&self) -> bool {
        match self {
            ScraperError::RateLimited { .. } => true,
            ScraperError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            ScraperError::Api { status, .. } => *status >= 500,
            ScraperError::Deserialize { .. }
            | ScraperError::RunFailed { .. }
            | ScraperError::RunTimedOut { .. }
            | ScraperError::MissingToken => false,
        }
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ScraperError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at 60 s, then scaled by a random factor in `[0.75, 1.25)`.
///
/// A server-provided `Retry-After` wins when it is longer.
fn backoff_delay_ms<E: Transient>(backoff_base_ms: u64, attempt: u32, err: &E) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    match err.retry_after_secs() {
        Some(retry_after_secs) if backoff_base_ms > 0 => {
            jittered.max(retry_after_secs.saturating_mul(1_000).min(MAX_DELAY_MS))
        }
        _ => jittered,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// With `max_retries = 3` the operation is attempted at most 4 times total.
/// A `backoff_base_ms` of zero disables sleeping, which tests rely on.
///
/// # Errors
///
/// Returns the last error once it is not retriable or retries are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, E>
where
    E: Transient,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt, &err);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited() -> ScraperError {
        ScraperError::RateLimited {
            retry_after_secs: 0,
        }
    }

    fn api_error(status: u16) -> ScraperError {
        ScraperError::Api {
            status,
            url: "https://api.apify.com/v2/acts/x/runs".to_owned(),
            message: "boom".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, ScraperError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_server_errors() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(1, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(api_error(502))
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(ScraperError::Api { status: 502, .. })));
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(rate_limited())
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(api_error(401))
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::Api { status: 401, .. })));
    }

    #[tokio::test]
    async fn does_not_retry_failed_runs() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(ScraperError::RunFailed {
                    run_id: "run1".to_owned(),
                    status: "ABORTED".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::RunFailed { .. })));
    }

    #[test]
    fn backoff_grows_and_stays_within_jitter_band() {
        let err = api_error(500);
        for _ in 0..20 {
            let first = backoff_delay_ms(1_000, 1, &err);
            assert!((750..1_250).contains(&first), "first delay {first}");
            let third = backoff_delay_ms(1_000, 3, &err);
            assert!((3_000..5_000).contains(&third), "third delay {third}");
        }
    }

    #[test]
    fn backoff_is_capped() {
        let delay = backoff_delay_ms(1_000, 30, &api_error(500));
        assert!(delay <= 75_000);
    }

    #[test]
    fn retry_after_extends_backoff() {
        let err = ScraperError::RateLimited {
            retry_after_secs: 30,
        };
        assert!(backoff_delay_ms(100, 1, &err) >= 30_000);
    }

    #[test]
    fn zero_base_disables_sleep() {
        let err = ScraperError::RateLimited {
            retry_after_secs: 30,
        };
        assert_eq!(backoff_delay_ms(0, 1, &err), 0);
    }
}
