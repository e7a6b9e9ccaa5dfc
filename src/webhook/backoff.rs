//! Backoff between retries of transient delivery failures.

use std::time::Duration;

/// Exponential backoff with jitter.
///
/// Applied only after transport failures and 5xx responses. Rate-limit
/// waits come from the server's headers, never from this policy.
///
/// # Defaults
///
/// - `initial_delay`: 500 milliseconds
/// - `max_delay`: 30 seconds
/// - `multiplier`: 2.0
/// - `jitter`: 0.1 (each delay varies by up to ±10%)
///
/// # Example
///
/// ```
/// use discord_webhooks::webhook::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::new()
///     .with_initial_delay(Duration::from_secs(1))
///     .with_max_delay(Duration::from_secs(10))
///     .with_multiplier(1.5)
///     .with_jitter(0.0);
///
/// assert_eq!(policy.delay_for_retry(1), Duration::from_millis(1500));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Upper bound on any single delay, jitter included.
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,

    /// Fraction of the computed delay that is randomized, in `[0.0, 1.0]`.
    pub jitter: f64,
}

impl BackoffPolicy {
    /// Default initial delay (500 milliseconds).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

    /// Default maximum delay (30 seconds).
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

    /// Default multiplier (2.0).
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Default jitter fraction (0.1).
    pub const DEFAULT_JITTER: f64 = 0.1;

    /// Creates a new backoff policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
            jitter: Self::DEFAULT_JITTER,
        }
    }

    /// Sets the delay before the first retry.
    ///
    /// Zero is allowed and useful in tests, but makes retries immediate.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the delay multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Sets the jitter fraction.
    ///
    /// # Panics
    ///
    /// Panics if `jitter` is outside `[0.0, 1.0]`.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&jitter),
            "jitter must be between 0.0 and 1.0"
        );
        self.jitter = jitter;
        self
    }

    /// Computes the un-jittered delay for a given retry number (0-indexed), capped at `max_delay`.
    #[must_use]
    pub fn base_delay_for_retry(&self, retry: u32) -> Duration {
        // Retry counts stay far below i32::MAX
        #[allow(clippy::cast_possible_wrap)]
        let multiplier = self.multiplier.powi(retry as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }

    /// Computes the delay for a given retry number (0-indexed).
    ///
    /// The base delay is scaled by a random factor in `[1 - jitter, 1 + jitter]`
    /// and then capped at `max_delay`.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let base = self.base_delay_for_retry(retry).as_secs_f64();
        if self.jitter == 0.0 {
            return Duration::from_secs_f64(base);
        }
        let factor = self.jitter.mul_add(fastrand::f64().mul_add(2.0, -1.0), 1.0);
        Duration::from_secs_f64((base * factor).min(self.max_delay.as_secs_f64()))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new()
    }
}
