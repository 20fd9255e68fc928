//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::defaults;

/// resilient-http: HTTP requests with retries, timeouts and typed decoding
///
/// Sends requests, prints response bodies and downloads files, retrying
/// timeouts and transient server errors with linear backoff.
#[derive(Debug, Parser)]
#[command(name = "resilient-http")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Retries after the first attempt
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Per-attempt timeout in milliseconds (0 or negative disables it)
    #[arg(long = "timeout-ms", global = true, allow_hyphen_values = true)]
    pub timeout_ms: Option<i64>,

    /// Backoff unit in milliseconds
    #[arg(long = "retry-interval-ms", global = true)]
    pub retry_interval_ms: Option<u64>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V", global = true)]
    pub headers: Vec<String>,

    /// Bearer token for Authorization header
    #[arg(long, global = true)]
    pub bearer: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for resilient-http
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a GET request and print the response body
    Get {
        /// Target URL
        url: String,

        /// Query parameters in 'Key=Value' format (can be specified multiple times)
        #[arg(long = "query", value_name = "K=V")]
        query: Vec<String>,
    },

    /// Send a request with any method and print the response body
    Send {
        /// Target URL
        url: String,

        /// HTTP method
        #[arg(long, short = 'X', default_value = defaults::METHOD)]
        method: String,

        /// Request body
        #[arg(long, short)]
        data: Option<String>,

        /// Content type of the request body
        #[arg(long = "content-type", requires = "data")]
        content_type: Option<String>,

        /// Query parameters in 'Key=Value' format (can be specified multiple times)
        #[arg(long = "query", value_name = "K=V")]
        query: Vec<String>,
    },

    /// Download the response body into a directory
    Download {
        /// Target URL
        url: String,

        /// Destination directory (created if missing)
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Query parameters in 'Key=Value' format (can be specified multiple times)
        #[arg(long = "query", value_name = "K=V")]
        query: Vec<String>,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
