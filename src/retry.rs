//! Retry policy: bounded exponential backoff and status classification.
//!
//! Client errors (4xx) are terminal. Server errors, any other non-200 status
//! and transport failures are retried until the budget runs out.

use std::time::Duration;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Default upper bound on any single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Default backoff growth factor.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Retries after the initial attempt (0 = a single attempt).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper clamp for every delay.
    pub max_delay: Duration,
    /// Backoff growth factor. Values below 1.0 are treated as 1.0.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryConfig {
    /// A config with the given retry budget and default delays.
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// A config that never retries.
    pub fn no_retry() -> Self {
        Self::with_retries(0)
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay clamp.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff growth factor.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Total attempts a call may make, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait before `attempt` (0-indexed).
    ///
    /// Attempt 0 goes out immediately. Attempt `n >= 1` waits
    /// `min(initial_delay * multiplier^(n-1), max_delay)`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 || self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        // f64::max ignores NaN, so a NaN multiplier also lands on 1.0
        let multiplier = self.multiplier.max(1.0);
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_nanos() as f64 * multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_nanos() as f64);

        Duration::from_nanos(capped as u64)
    }

    /// The delays before each retry this config allows, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_retries).map(move |attempt| self.delay_before(attempt))
    }
}

/// How a single HTTP status affects the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200: decode the body.
    Success,
    /// 4xx: stop, the request itself is wrong.
    ClientError,
    /// Everything else: try again if budget remains.
    Retryable,
}

/// Classify an HTTP status code.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        400..=499 => StatusClass::ClientError,
        _ => StatusClass::Retryable,
    }
}
