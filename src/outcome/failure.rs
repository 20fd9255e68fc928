//! Failure descriptions carried by non-success outcomes.

use std::error::Error;

use thiserror::Error;

/// Boxed, thread-safe error used as the cause of a [`Failure`].
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Well-known status codes used when no HTTP response is available.
pub mod status_code {
    /// The outcome has no meaningful status code.
    pub const NOT_APPLICABLE: u16 = 0;
    /// The request could not be built.
    pub const BAD_REQUEST: u16 = 400;
    /// An attempt exceeded its deadline.
    pub const REQUEST_TIMEOUT: u16 = 408;
    /// Decoding, transport or filesystem failure.
    pub const INTERNAL_ERROR: u16 = 500;
}

/// Classification of why an operation did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request descriptor could not be turned into a transport message.
    InvalidRequest,
    /// The caller cancelled the operation.
    Cancelled,
    /// Every attempt exceeded the per-attempt timeout.
    Timeout,
    /// The server kept answering with a status from the transient set.
    TransientServerError,
    /// The server answered with a non-2xx status outside the transient set.
    NonTransientServerError,
    /// The response body did not match the expected shape.
    DecodeError,
    /// No decoder is registered for the response content type.
    UnhandledContentType,
    /// Low-level failure (DNS, connection refused, broken body stream).
    TransportError,
    /// Local filesystem failure while downloading.
    Io,
}

impl ErrorKind {
    /// Returns the status code reported for this kind when no response
    /// status is available.
    #[must_use]
    pub const fn default_status_code(self) -> u16 {
        match self {
            Self::InvalidRequest => status_code::BAD_REQUEST,
            Self::Timeout => status_code::REQUEST_TIMEOUT,
            Self::Cancelled => status_code::NOT_APPLICABLE,
            Self::TransientServerError
            | Self::NonTransientServerError
            | Self::DecodeError
            | Self::UnhandledContentType
            | Self::TransportError
            | Self::Io => status_code::INTERNAL_ERROR,
        }
    }
}

/// Why an operation was cancelled or failed.
///
/// Built once by the stage that determined the outcome and never
/// mutated afterwards.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Failure {
    kind: ErrorKind,
    status_code: u16,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl Failure {
    /// Creates a failure with an explicit status code.
    #[must_use]
    pub fn new(kind: ErrorKind, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a failure using the kind's default status code.
    #[must_use]
    pub fn of(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, kind.default_status_code(), message)
    }

    /// Creates the failure describing a caller-requested cancellation.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::of(ErrorKind::Cancelled, "Operation was cancelled")
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the transport or protocol status code (0 when not applicable).
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns the message followed by every nested cause, innermost first.
    ///
    /// ```
    /// use resilient_http::outcome::{ErrorKind, Failure};
    ///
    /// let io = std::io::Error::other("disk full");
    /// let failure = Failure::of(ErrorKind::Io, "Download failed").with_source(io);
    /// assert_eq!(failure.chain_message(), "Download failed <- disk full");
    /// ```
    #[must_use]
    pub fn chain_message(&self) -> String {
        let mut causes = Vec::new();
        let mut current: Option<&(dyn Error + 'static)> =
            self.source.as_deref().map(|e| e as &(dyn Error + 'static));
        while let Some(error) = current {
            causes.push(error.to_string());
            current = error.source();
        }

        std::iter::once(self.message.clone())
            .chain(causes.into_iter().rev())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" <- ")
    }
}
