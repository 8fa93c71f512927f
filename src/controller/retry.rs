//! Bounded retry wrapper for a single remote call.
//!
//! Attempts are immediate: there is no backoff between them and no
//! per-attempt timeout beyond whatever the transport enforces.
use std::fmt::Display;
use std::future::Future;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    /// Returns true if this error is transient and the call may be repeated.
    fn is_retryable(&self) -> bool;
}

/// Run `op` up to `max_attempts` times, returning the first success or the
/// last failure.
///
/// A `max_attempts` of 0 still makes one attempt. Callers must accept that a
/// non-idempotent operation may take effect more than once.
pub async fn with_retry<F, Fut, T, E>(max_attempts: u32, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry_if(max_attempts, op, |_| true).await
}

/// Like [`with_retry`], but a failure for which `should_retry` returns false
/// is handed back immediately.
pub async fn with_retry_if<F, Fut, T, E, P>(
    max_attempts: u32,
    mut op: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                tracing::debug!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    "Retrying remote call after failure"
                );
                attempt += 1;
            }
            Err(e) => {
                if attempt > 1 {
                    tracing::warn!(error = %e, attempts = attempt, "Remote call failed after retries");
                }
                return Err(e);
            }
        }
    }
}
