//! Resilient call wrapper: retry with exponential backoff.
//!
//! The single point where a remote call's failure may be absorbed more
//! than once. All call sites reuse this wrapper rather than rolling
//! their own retry loops. Backoff doubles without cap or jitter; the
//! attempt-count semantics must not change (a delay ceiling would be a
//! separate, documented enhancement).

use crate::error::{EngineError, EngineResult};
use cliq_exchange::ExchangeError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry budget shared by every remote call site.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure; doubled after each subsequent one.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Run a fallible async operation under the retry policy.
///
/// Resolves with the first successful attempt, short-circuiting the
/// remaining budget. Each failure is logged with the attempt number and
/// any exchange error code/URL, then waited out with the current delay
/// before the delay doubles. Once the budget is spent the last observed
/// error is returned; `RetriesExhausted` can only surface when the
/// policy allowed zero attempts.
pub async fn with_retries<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut call: F,
) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExchangeError>>,
{
    let mut delay = policy.initial_delay;
    let mut last_error: Option<ExchangeError> = None;

    for attempt in 1..=policy.max_attempts {
        match call().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    retry_in_ms = delay.as_millis() as u64,
                    code = ?error.code(),
                    url = ?error.url(),
                    error = %error,
                    "Remote call failed"
                );
                last_error = Some(error);
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }

    Err(last_error
        .map(EngineError::Exchange)
        .unwrap_or_else(|| EngineError::RetriesExhausted(operation.to_string())))
}
