//! Tests for `RetryPolicy`.

use super::RetryPolicy;
use std::time::Duration;

mod retry_policy_defaults {
    use super::*;

    #[test]
    fn new_creates_policy_with_defaults() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.retries, 3);
        assert_eq!(policy.timeout, Some(Duration::from_secs(10)));
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(
            policy.transient_statuses.iter().copied().collect::<Vec<_>>(),
            vec![408, 429, 500, 502, 503, 504]
        );
    }

    #[test]
    fn default_trait_matches_new() {
        assert_eq!(RetryPolicy::new(), RetryPolicy::default());
    }
}

mod retry_policy_builder {
    use super::*;

    #[test]
    fn with_retries_sets_value() {
        assert_eq!(RetryPolicy::new().with_retries(0).retries, 0);
        assert_eq!(RetryPolicy::new().with_retries(7).retries, 7);
    }

    #[test]
    fn with_timeout_zero_disables() {
        let policy = RetryPolicy::new().with_timeout(Some(Duration::ZERO));
        assert_eq!(policy.timeout, None);

        let policy = RetryPolicy::new().with_timeout(Some(Duration::from_secs(2)));
        assert_eq!(policy.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn with_timeout_millis_non_positive_disables() {
        assert_eq!(RetryPolicy::new().with_timeout_millis(0).timeout, None);
        assert_eq!(RetryPolicy::new().with_timeout_millis(-5).timeout, None);
        assert_eq!(
            RetryPolicy::new().with_timeout_millis(1500).timeout,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn with_transient_statuses_replaces_set() {
        let policy = RetryPolicy::new().with_transient_statuses([599]);

        assert!(policy.is_transient(599));
        assert!(!policy.is_transient(503));
    }
}

mod delay_calculation {
    use super::*;

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::new().with_interval(Duration::from_millis(250));

        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(750));
    }

    #[test]
    fn zero_interval_means_no_wait() {
        let policy = RetryPolicy::new().with_interval(Duration::ZERO);
        assert_eq!(policy.delay_for_retry(5), Duration::ZERO);
    }

    #[test]
    fn huge_retry_number_saturates() {
        let policy = RetryPolicy::new().with_interval(Duration::MAX);
        assert_eq!(policy.delay_for_retry(2), Duration::MAX);
    }
}

mod should_retry {
    use super::*;

    #[test]
    fn allows_exactly_the_configured_retries() {
        let policy = RetryPolicy::new().with_retries(2);

        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[test]
    fn zero_retries_never_retries() {
        assert!(!RetryPolicy::new().with_retries(0).should_retry(0));
    }
}

mod transient_statuses {
    use super::*;

    #[test]
    fn default_set_membership() {
        let policy = RetryPolicy::new();

        for status in [408, 429, 500, 502, 503, 504] {
            assert!(policy.is_transient(status), "{status} should be transient");
        }
        for status in [200, 400, 401, 404, 501, 505] {
            assert!(!policy.is_transient(status), "{status} should not be transient");
        }
    }
}
