//! In-process client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::decode::{DecodeStrategy, Decoders};
use crate::engine::RetryPolicy;

/// Configuration shared by every request a [`RestClient`] sends.
///
/// Read-only while requests are in flight. The header and decoder
/// collections may be extended between requests through the public
/// fields or [`RestClient::config_mut`]; nothing here is locked.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use resilient_http::config::ClientConfig;
/// use resilient_http::decode::DecodeStrategy;
///
/// let config = ClientConfig::new()
///     .with_retries(5)
///     .with_timeout(Some(Duration::from_secs(2)))
///     .with_common_header("User-Agent", "reports/1.0")
///     .with_decoder("application/problem+json", DecodeStrategy::Json);
///
/// assert_eq!(config.retry.retries, 5);
/// assert_eq!(config.common_headers["User-Agent"], "reports/1.0");
/// ```
///
/// [`RestClient`]: crate::rest::RestClient
/// [`RestClient::config_mut`]: crate::rest::RestClient::config_mut
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Retry count, per-attempt timeout, backoff unit and transient statuses.
    pub retry: RetryPolicy,

    /// Name of the registered transport to use. `None` selects the default.
    pub client_name: Option<String>,

    /// Headers merged into every request; request headers win.
    pub common_headers: BTreeMap<String, String>,

    /// Content-type to decoder mapping.
    pub decoders: Decoders,
}

impl ClientConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            retry: RetryPolicy::default(),
            client_name: None,
            common_headers: BTreeMap::new(),
            decoders: Decoders::default(),
        }
    }

    /// Sets the number of retries after the first attempt.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retry = self.retry.with_retries(retries);
        self
    }

    /// Sets the per-attempt timeout. `None` or zero disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.retry = self.retry.with_timeout(timeout);
        self
    }

    /// Sets the per-attempt timeout in milliseconds; zero or negative disables it.
    #[must_use]
    pub fn with_timeout_millis(mut self, millis: i64) -> Self {
        self.retry = self.retry.with_timeout_millis(millis);
        self
    }

    /// Sets the backoff unit.
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry = self.retry.with_interval(interval);
        self
    }

    /// Selects a named transport.
    #[must_use]
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Adds a common header.
    ///
    /// An existing header with the same name, compared case-insensitively,
    /// is replaced.
    #[must_use]
    pub fn with_common_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_common_header(name, value);
        self
    }

    /// Adds a status to the transient set.
    #[must_use]
    pub fn with_transient_status(mut self, status: u16) -> Self {
        self.retry.transient_statuses.insert(status);
        self
    }

    /// Replaces the decoder mapping.
    #[must_use]
    pub fn with_decoders(mut self, decoders: Decoders) -> Self {
        self.decoders = decoders;
        self
    }

    /// Registers one decoder on top of the current mapping.
    #[must_use]
    pub fn with_decoder(mut self, content_type: impl Into<String>, strategy: DecodeStrategy) -> Self {
        self.decoders.register(content_type, strategy);
        self
    }

    /// Inserts or replaces a common header in place.
    pub fn set_common_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.common_headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.common_headers.insert(name, value.into());
    }

    /// Removes a common header, ignoring ASCII case. Returns the old value.
    pub fn remove_common_header(&mut self, name: &str) -> Option<String> {
        let key = self
            .common_headers
            .keys()
            .find(|existing| existing.eq_ignore_ascii_case(name))?
            .clone();
        self.common_headers.remove(&key)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
