//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Retry, timeout and transport selection
    #[serde(default)]
    pub client: ClientSection,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Extra content-type to decoder mappings ("json", "xml" or "raw")
    #[serde(default)]
    pub decoders: BTreeMap<String, String>,
}

/// Client configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Retries after the first attempt
    pub retries: Option<u32>,

    /// Per-attempt timeout in milliseconds; zero or negative disables it
    pub timeout_ms: Option<i64>,

    /// Backoff unit in milliseconds
    pub retry_interval_ms: Option<u64>,

    /// Name of the registered transport to use
    pub name: Option<String>,

    /// Statuses that are retried
    pub transient_status_codes: Option<Vec<u16>>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# resilient-http configuration file

[client]
# Retries after the first attempt (default: 3)
# retries = 3

# Per-attempt timeout in milliseconds; 0 or negative disables it (default: 10000)
# timeout_ms = 10000

# Backoff unit in milliseconds. Retry r waits r * retry_interval_ms (default: 250)
# retry_interval_ms = 250

# Statuses that are retried (default: [408, 429, 500, 502, 503, 504])
# transient_status_codes = [408, 429, 500, 502, 503, 504]

[headers]
# Sent with every request; --header and per-request headers win
# User-Agent = "resilient-http"
# Accept = "application/json"

[decoders]
# Extra content types and how to decode them: "json", "xml" or "raw".
# Matching is a case-insensitive substring test on the response Content-Type.
# "application/vnd.api+json" = "json"
# "application/atom+xml" = "xml"
"#
    .to_string()
}
