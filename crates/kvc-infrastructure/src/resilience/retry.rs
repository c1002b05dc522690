//! Retry with exponential backoff
//!
//! Only transient errors (connectivity, timeouts, pool exhaustion) are
//! retried. Store errors and misuse are returned on the first attempt.

use crate::config::RetryConfig;
use crate::constants::RETRY_MAX_BACKOFF_MS;
use crate::utils::millis;
use kvc_domain::error::Result;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for store operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Policy from configuration; disabled retry means a single attempt
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: if config.enabled { config.max_attempts.max(1) } else { 1 },
            backoff: Duration::from_millis(config.backoff_ms),
            max_backoff: Duration::from_millis(RETRY_MAX_BACKOFF_MS),
        }
    }

    /// Single attempt, no retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Attempts including the first call
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base delay before retry number `retry` (1-based), without jitter
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Delay before retry number `retry`, with up to 10% jitter added
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        let jitter_ceiling = u64::try_from(base.as_millis() / 10).unwrap_or(u64::MAX);
        if jitter_ceiling == 0 {
            return base;
        }
        let jitter = rand::rng().random_range(0..=jitter_ceiling);
        base + Duration::from_millis(jitter)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    debug!(
                        operation = label,
                        attempt,
                        delay_ms = millis(delay),
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() && self.max_attempts > 1 {
                        warn!(operation = label, attempts = attempt, error = %e, "Retries exhausted");
                    }
                    return Err(e);
                }
            }
        }
    }
}
