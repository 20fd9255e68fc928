//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

use crate::engine::RetryPolicy;

/// Default HTTP method for the `send` command.
pub const METHOD: &str = "GET";

/// Default number of retries after the first attempt.
pub const RETRIES: u32 = RetryPolicy::DEFAULT_RETRIES;

/// Default per-attempt timeout in milliseconds.
pub const TIMEOUT_MS: i64 = 10_000;

/// Default backoff unit in milliseconds.
pub const RETRY_INTERVAL_MS: u64 = 250;

/// Statuses retried unless the configuration says otherwise.
pub const TRANSIENT_STATUS_CODES: [u16; 6] = RetryPolicy::DEFAULT_TRANSIENT_STATUSES;

/// File name written by `init` when no output path is given.
pub const CONFIG_FILE: &str = "resilient-http.toml";

/// Default backoff unit as Duration.
#[must_use]
pub const fn retry_interval() -> Duration {
    Duration::from_millis(RETRY_INTERVAL_MS)
}
