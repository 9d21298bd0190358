//! Retry with exponential back-off and jitter for provider requests.
//!
//! Transient failures (timeouts, connection errors, 5xx, 429) are retried;
//! everything else is returned on the first attempt. Callers still see the
//! final error and decide how to degrade.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Base delay; the n-th retry waits roughly `base * 2^(n-1)`.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** network timeouts and connect failures, HTTP 5xx, HTTP 429.
///
/// **Not retriable:** other statuses, API-level errors, and malformed bodies,
/// since repeating the request returns the same answer.
pub(crate) fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ProviderError::RateLimited { .. } => true,
        ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
        ProviderError::Api { .. }
        | ProviderError::Parse { .. }
        | ProviderError::Deserialize { .. }
        | ProviderError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation`, retrying transient errors according to `policy`.
///
/// Each sleep is `backoff_base_ms * 2^(attempt-1)` scaled by a ±25 % jitter
/// and capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    provider: &'static str,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    provider,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient provider error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
