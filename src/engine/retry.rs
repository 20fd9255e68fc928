//! Retry policy for the execution engine.

use std::collections::BTreeSet;
use std::time::Duration;

/// Configuration for linear backoff retry behavior.
///
/// Controls how many times a request is retried, how long each physical
/// attempt may take, how long to wait between attempts, and which
/// response statuses are worth another attempt.
///
/// # Defaults
///
/// - `retries`: 3 (so at most 4 physical attempts)
/// - `timeout`: 10 seconds per attempt
/// - `interval`: 250 milliseconds
/// - `transient_statuses`: 408, 429, 500, 502, 503, 504
///
/// # Example
///
/// ```
/// use resilient_http::engine::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_retries(2)
///     .with_interval(Duration::from_millis(100))
///     .with_timeout(Some(Duration::from_secs(5)));
///
/// assert_eq!(policy.delay_for_retry(1), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_retry(2), Duration::from_millis(200));
/// assert!(policy.is_transient(503));
/// assert!(!policy.is_transient(404));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt.
    pub retries: u32,

    /// Per-attempt timeout. `None` disables it.
    pub timeout: Option<Duration>,

    /// Backoff unit. The wait before retry `r` is `interval * r`.
    pub interval: Duration,

    /// Response statuses treated as transient.
    pub transient_statuses: BTreeSet<u16>,
}

impl RetryPolicy {
    /// Default number of retries.
    pub const DEFAULT_RETRIES: u32 = 3;

    /// Default per-attempt timeout (10 seconds).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default backoff unit (250 milliseconds).
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

    /// Default transient statuses.
    pub const DEFAULT_TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

    /// Creates a new retry policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            retries: Self::DEFAULT_RETRIES,
            timeout: Some(Self::DEFAULT_TIMEOUT),
            interval: Self::DEFAULT_INTERVAL,
            transient_statuses: Self::DEFAULT_TRANSIENT_STATUSES.into_iter().collect(),
        }
    }

    /// Sets the number of retries. Zero means a single attempt.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the per-attempt timeout. `None` or a zero duration disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Sets the per-attempt timeout in milliseconds; zero or negative disables it.
    #[must_use]
    pub fn with_timeout_millis(self, millis: i64) -> Self {
        let timeout = u64::try_from(millis).ok().map(Duration::from_millis);
        self.with_timeout(timeout)
    }

    /// Sets the backoff unit.
    ///
    /// Zero is supported (useful in tests) but creates a tight retry loop.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replaces the set of transient statuses.
    #[must_use]
    pub fn with_transient_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.transient_statuses = statuses.into_iter().collect();
        self
    }

    /// Computes the delay before retry number `retry` (1-based).
    ///
    /// Linear: the first retry waits one interval, the second two, and so on.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.interval.saturating_mul(retry)
    }

    /// Returns true if another attempt is allowed after `retries_used` retries.
    #[must_use]
    pub const fn should_retry(&self, retries_used: u32) -> bool {
        retries_used < self.retries
    }

    /// Returns true if the status is in the transient set.
    #[must_use]
    pub fn is_transient(&self, status: u16) -> bool {
        self.transient_statuses.contains(&status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
