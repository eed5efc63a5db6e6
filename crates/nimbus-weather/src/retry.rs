//! Retry with exponential backoff for provider requests.
//!
//! Retried: timeouts, connection failures, 5xx/408 responses, rate limiting.
//! Not retried: unknown cities, bad keys, malformed responses, bad input.

use std::future::Future;
use std::time::Duration;

use nimbus_core::{ProviderConfig, ProviderError};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry (doubles each attempt)
    pub initial_delay: Duration,
    /// Ceiling for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            config.max_retries,
            config.retry_initial_delay_ms,
            config.retry_max_delay_ms,
        )
    }

    /// Delay before retry number `attempt` (0-based): initial * 2^attempt, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped)
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
///
/// Returns the last error when every attempt failed.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Request succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    "Retryable error on attempt {} of {}: {}; retrying in {:?}",
                    attempt + 1,
                    policy.max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!("All {} attempts exhausted: {}", attempt + 1, e);
                } else {
                    tracing::debug!("Non-retryable error: {}", e);
                }
                return Err(e);
            }
        }
    }
}
