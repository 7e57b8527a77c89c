//! Retry with exponential back-off and jitter for chat-completion calls.
//!
//! [`retry_with_backoff`] wraps one request and retries on transient errors
//! (network failures, 429, 5xx). Everything else is returned immediately:
//! a 4xx or an undecodable body will not improve on a second attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** other HTTP statuses, [`LlmError::Deserialize`],
/// [`LlmError::InvalidBaseUrl`].
pub(crate) fn is_retriable(err: &LlmError) -> bool {
    match err {
        LlmError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LlmError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        LlmError::Deserialize { .. } | LlmError::InvalidBaseUrl { .. } => false,
    }
}

/// Un-jittered delay before retry number `retry` (1-based): `base × 2^(retry-1)`,
/// capped at 30 s.
fn backoff_delay(retry: u32, backoff_base_ms: u64) -> u64 {
    let exponent = retry.saturating_sub(1).min(10);
    backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(MAX_DELAY_MS)
}

/// Spreads `delay_ms` uniformly over ±25 %.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jitter(delay_ms: u64) -> u64 {
    (delay_ms as f64 * rand::random_range(0.75..1.25)) as u64
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
///
/// With `backoff_base_ms = 500` the waits are roughly 0.5 s, 1 s, 2 s, ...
/// (±25 % jitter, capped at 30 s).
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retries += 1;
        let delay_ms = jitter(backoff_delay(retries, backoff_base_ms));
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms,
            error = %err,
            "chat completion transient error, retrying after back-off"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
