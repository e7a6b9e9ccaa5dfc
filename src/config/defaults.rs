//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default HTTP request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default maximum number of retries.
pub const MAX_RETRIES: u32 = crate::webhook::DEFAULT_MAX_RETRIES;

/// Default initial backoff delay in milliseconds.
pub const BACKOFF_INITIAL_DELAY_MS: u64 = 500;

/// Default maximum backoff delay in milliseconds.
pub const BACKOFF_MAX_DELAY_MS: u64 = 30_000;

/// Default backoff multiplier.
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default backoff jitter fraction.
pub const BACKOFF_JITTER: f64 = 0.1;

/// Default HTTP request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}
