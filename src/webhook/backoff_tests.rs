//! Tests for `BackoffPolicy`.

use super::BackoffPolicy;
use std::time::Duration;

fn no_jitter() -> BackoffPolicy {
    BackoffPolicy::new().with_jitter(0.0)
}

mod defaults {
    use super::*;

    #[test]
    fn new_creates_policy_with_defaults() {
        let policy = BackoffPolicy::new();

        assert_eq!(policy.initial_delay, BackoffPolicy::DEFAULT_INITIAL_DELAY);
        assert_eq!(policy.max_delay, BackoffPolicy::DEFAULT_MAX_DELAY);
        assert!((policy.multiplier - BackoffPolicy::DEFAULT_MULTIPLIER).abs() < f64::EPSILON);
        assert!((policy.jitter - BackoffPolicy::DEFAULT_JITTER).abs() < f64::EPSILON);
    }

    #[test]
    fn default_trait_matches_new() {
        assert_eq!(BackoffPolicy::new(), BackoffPolicy::default());
    }

    #[test]
    fn default_initial_delay_is_half_a_second() {
        assert_eq!(
            BackoffPolicy::DEFAULT_INITIAL_DELAY,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn default_max_delay_is_30_seconds() {
        assert_eq!(BackoffPolicy::DEFAULT_MAX_DELAY, Duration::from_secs(30));
    }
}

mod builder {
    use super::*;

    #[test]
    fn with_initial_delay_sets_value() {
        let delay = Duration::from_millis(100);
        let policy = BackoffPolicy::new().with_initial_delay(delay);
        assert_eq!(policy.initial_delay, delay);
    }

    #[test]
    fn with_max_delay_sets_value() {
        let delay = Duration::from_secs(120);
        let policy = BackoffPolicy::new().with_max_delay(delay);
        assert_eq!(policy.max_delay, delay);
    }

    #[test]
    #[should_panic(expected = "multiplier must be positive")]
    fn with_multiplier_zero_panics() {
        let _ = BackoffPolicy::new().with_multiplier(0.0);
    }

    #[test]
    #[should_panic(expected = "jitter must be between 0.0 and 1.0")]
    fn with_jitter_above_one_panics() {
        let _ = BackoffPolicy::new().with_jitter(1.5);
    }

    #[test]
    #[should_panic(expected = "jitter must be between 0.0 and 1.0")]
    fn with_jitter_negative_panics() {
        let _ = BackoffPolicy::new().with_jitter(-0.1);
    }
}

mod delay_for_retry {
    use super::*;

    #[test]
    fn first_retry_returns_initial_delay() {
        let policy = no_jitter().with_initial_delay(Duration::from_secs(5));
        assert_eq!(policy.delay_for_retry(0), Duration::from_secs(5));
    }

    #[test]
    fn later_retries_multiply_delay() {
        let policy = no_jitter()
            .with_initial_delay(Duration::from_secs(1))
            .with_multiplier(2.0);

        assert_eq!(policy.delay_for_retry(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(2), Duration::from_secs(4));
    }

    #[test]
    fn delay_is_capped_at_max() {
        let policy = no_jitter()
            .with_initial_delay(Duration::from_secs(10))
            .with_max_delay(Duration::from_secs(30));

        // 10 * 2^2 = 40 -> capped at 30
        assert_eq!(policy.delay_for_retry(2), Duration::from_secs(30));
    }

    #[test]
    fn jittered_delay_stays_within_band() {
        let policy = BackoffPolicy::new()
            .with_initial_delay(Duration::from_secs(10))
            .with_max_delay(Duration::from_secs(100))
            .with_jitter(0.5);

        for _ in 0..200 {
            let delay = policy.delay_for_retry(0);
            assert!(delay >= Duration::from_secs(5), "{delay:?} below band");
            assert!(delay <= Duration::from_secs(15), "{delay:?} above band");
        }
    }

    #[test]
    fn jitter_never_exceeds_max_delay() {
        let policy = BackoffPolicy::new()
            .with_initial_delay(Duration::from_secs(30))
            .with_max_delay(Duration::from_secs(30))
            .with_jitter(1.0);

        for _ in 0..200 {
            assert!(policy.delay_for_retry(3) <= Duration::from_secs(30));
        }
    }

    #[test]
    fn zero_initial_delay_is_always_zero() {
        let policy = BackoffPolicy::new().with_initial_delay(Duration::ZERO);

        for retry in 0..5 {
            assert_eq!(policy.delay_for_retry(retry), Duration::ZERO);
        }
    }
}
