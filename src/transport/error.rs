//! Error types for transport operations.

use thiserror::Error;

/// Error type for a single physical HTTP exchange.
///
/// Describes what went wrong without dictating recovery strategy; the
/// engine decides whether a failure is worth another attempt. Non-2xx
/// responses are not errors at this level.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out inside the transport.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Reading or writing a body stream failed.
    #[error("Body stream error: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),
}
