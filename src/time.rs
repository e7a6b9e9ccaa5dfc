//! Wall-clock abstraction for testability.
//!
//! Rate-limit waits are measured on tokio's monotonic clock, but Discord's
//! `X-RateLimit-Reset` header is an absolute Unix timestamp. The [`Clock`]
//! trait converts such timestamps into relative waits and lets tests inject
//! a fixed wall clock.

use std::time::{Duration, SystemTime};

/// Abstraction over system time for testability.
///
/// # Example
///
/// ```
/// use discord_webhooks::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns how long until the given Unix timestamp (fractional seconds).
    ///
    /// Timestamps in the past, and non-finite or negative inputs, yield zero.
    /// Timestamps too far out to represent yield [`Duration::MAX`]; callers clamp.
    fn until_epoch_secs(&self, epoch_secs: f64) -> Duration {
        if !epoch_secs.is_finite() || epoch_secs < 0.0 {
            return Duration::ZERO;
        }
        let target = Duration::try_from_secs_f64(epoch_secs)
            .ok()
            .and_then(|since_epoch| SystemTime::UNIX_EPOCH.checked_add(since_epoch));
        target.map_or(Duration::MAX, |target| self.until(target))
    }

    /// Returns how long until `target`, or zero if it has passed.
    fn until(&self, target: SystemTime) -> Duration {
        target.duration_since(self.now()).unwrap_or(Duration::ZERO)
    }
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockClock;
    use super::*;

    #[test]
    fn system_clock_returns_current_time() {
        let clock = SystemClock;
        let before = SystemTime::now();
        let result = clock.now();
        let after = SystemTime::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn system_clock_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemClock>();
    }

    #[test]
    fn mock_clock_can_advance() {
        let clock = MockClock::at_secs(0);
        assert_eq!(clock.now(), SystemTime::UNIX_EPOCH);

        clock.advance(Duration::from_millis(1500));
        assert_eq!(
            clock.now(),
            SystemTime::UNIX_EPOCH + Duration::from_millis(1500)
        );
    }

    #[test]
    fn until_epoch_secs_measures_future_timestamp() {
        let clock = MockClock::at_secs(1_000);

        assert_eq!(clock.until_epoch_secs(1_005.5), Duration::from_millis(5500));
    }

    #[test]
    fn until_epoch_secs_is_zero_for_past_timestamp() {
        let clock = MockClock::at_secs(1_000);

        assert_eq!(clock.until_epoch_secs(999.0), Duration::ZERO);
    }

    #[test]
    fn until_epoch_secs_rejects_garbage() {
        let clock = MockClock::at_secs(1_000);

        assert_eq!(clock.until_epoch_secs(f64::NAN), Duration::ZERO);
        assert_eq!(clock.until_epoch_secs(-3.0), Duration::ZERO);
        assert_eq!(clock.until_epoch_secs(f64::INFINITY), Duration::ZERO);
    }

    #[test]
    fn until_epoch_secs_saturates_for_unrepresentable_timestamp() {
        let clock = MockClock::at_secs(1_000);

        assert_eq!(clock.until_epoch_secs(1e20), Duration::MAX);
        assert_eq!(clock.until_epoch_secs(f64::MAX), Duration::MAX);
    }

    #[test]
    fn until_measures_to_system_time() {
        let clock = MockClock::at_secs(1_000);
        let target = SystemTime::UNIX_EPOCH + Duration::from_secs(1_030);

        assert_eq!(clock.until(target), Duration::from_secs(30));
        assert_eq!(clock.until(SystemTime::UNIX_EPOCH), Duration::ZERO);
    }
}
