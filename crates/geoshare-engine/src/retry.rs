//! Back-off between retries of a timed-out request.
//!
//! The retry counter lives in the conversion state, not here: a policy only
//! answers whether another attempt is allowed and how long to wait first.

use std::time::Duration;

use geoshare_core::AppConfig;
use tokio_util::sync::CancellationToken;

use crate::error::NetworkError;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.max_retries, config.retry_backoff_base_ms)
    }

    /// Whether a request that already failed `retry` times may run again.
    #[must_use]
    pub fn can_retry(&self, retry: u32) -> bool {
        retry < self.max_retries
    }

    /// Delay before attempt number `retry` (1-based):
    /// `base * 2^(retry-1)`, capped at 60 s, with ±25 % jitter.
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let computed = self
            .backoff_base_ms
            .saturating_mul(1u64 << (retry - 1).min(10));
        let capped = computed.min(MAX_DELAY_MS);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        Duration::from_millis(delay_ms)
    }

    /// Sleeps for [`RetryPolicy::delay`] unless `cancel` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Cancelled`] when the token is cancelled before
    /// the delay elapses.
    pub async fn wait(&self, retry: u32, cancel: &CancellationToken) -> Result<(), NetworkError> {
        let delay = self.delay(retry);
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(NetworkError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 500)
    }
}
