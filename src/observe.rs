//! Logging side channel for the request pipeline.
//!
//! The pipeline reports what it is doing as [`Event`]s to an
//! [`Observer`]. Observers only watch: nothing they do feeds back into
//! control flow, so a client with [`NoopObserver`] behaves exactly like one
//! with [`TracingObserver`].

use std::fmt;
use std::path::Path;
use std::time::Duration;

use http::Method;
use url::Url;

use crate::outcome::Failure;

/// Severity at which an event should be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Internal decisions.
    Debug,
    /// Normal progress.
    Info,
    /// Recoverable trouble (retry, timeout, cancellation).
    Warn,
    /// Final failure.
    Error,
}

/// Why an attempt is being retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// The attempt exceeded the per-attempt timeout.
    Timeout,
    /// The server answered with a transient status code.
    TransientStatus(u16),
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::TransientStatus(status) => write!(f, "status {status}"),
        }
    }
}

/// Something that happened while processing a request.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The transport message was prepared.
    Prepared {
        /// Final URL including query string.
        url: &'a Url,
        /// Number of headers after merging.
        header_count: usize,
    },
    /// A logical send started.
    RequestStarted {
        /// Request method.
        method: &'a Method,
        /// Target URL.
        url: &'a Url,
    },
    /// A logical send finished with a 2xx response.
    RequestCompleted {
        /// Target URL.
        url: &'a Url,
        /// Response status code.
        status: u16,
        /// Number of physical attempts made.
        attempts: u32,
    },
    /// An attempt exceeded the per-attempt timeout.
    AttemptTimedOut {
        /// Target URL.
        url: &'a Url,
        /// 1-based attempt number.
        attempt: u32,
    },
    /// A retry was scheduled after a backoff delay.
    RetryScheduled {
        /// Target URL.
        url: &'a Url,
        /// 1-based number of the upcoming attempt.
        next_attempt: u32,
        /// Backoff delay before the upcoming attempt.
        delay: Duration,
        /// What triggered the retry.
        reason: RetryReason,
    },
    /// The caller cancelled the operation.
    Cancelled {
        /// Target URL.
        url: &'a Url,
    },
    /// A logical send failed for good.
    RequestFailed {
        /// Target URL.
        url: &'a Url,
        /// The final failure.
        failure: &'a Failure,
    },
    /// A decoder was chosen for a response.
    DecoderSelected {
        /// Response content type.
        content_type: &'a str,
        /// Registered key that matched.
        matched: &'a str,
        /// Name of the decoding strategy.
        strategy: &'static str,
    },
    /// A download started streaming to disk.
    DownloadStarted {
        /// Source URL.
        url: &'a Url,
        /// Destination directory.
        directory: &'a Path,
    },
    /// A download was placed at its final path.
    DownloadFinished {
        /// Source URL.
        url: &'a Url,
        /// Final file path.
        path: &'a Path,
        /// Number of bytes written.
        bytes: u64,
    },
}

impl Event<'_> {
    /// Returns the level at which this event should be logged.
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::Prepared { .. } | Self::DecoderSelected { .. } => Level::Debug,
            Self::RequestStarted { .. }
            | Self::RequestCompleted { .. }
            | Self::DownloadStarted { .. }
            | Self::DownloadFinished { .. } => Level::Info,
            Self::AttemptTimedOut { .. } | Self::RetryScheduled { .. } | Self::Cancelled { .. } => {
                Level::Warn
            }
            Self::RequestFailed { .. } => Level::Error,
        }
    }
}

/// Receives pipeline events.
pub trait Observer: Send + Sync + fmt::Debug {
    /// Called for every event. Must not panic.
    fn on_event(&self, event: &Event<'_>);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _event: &Event<'_>) {}
}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &Event<'_>) {
        match *event {
            Event::Prepared { url, header_count } => {
                tracing::debug!(%url, header_count, "Prepared request");
            }
            Event::RequestStarted { method, url } => {
                tracing::info!(%method, %url, "Sending request");
            }
            Event::RequestCompleted {
                url,
                status,
                attempts,
            } => {
                tracing::info!(%url, status, attempts, "Request completed");
            }
            Event::AttemptTimedOut { url, attempt } => {
                tracing::warn!(%url, attempt, "Attempt timed out");
            }
            Event::RetryScheduled {
                url,
                next_attempt,
                delay,
                reason,
            } => {
                tracing::warn!(
                    %url,
                    next_attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    %reason,
                    "Retrying request"
                );
            }
            Event::Cancelled { url } => {
                tracing::warn!(%url, "Request cancelled");
            }
            Event::RequestFailed { url, failure } => {
                tracing::error!(
                    %url,
                    status = failure.status_code(),
                    kind = ?failure.kind(),
                    "Request failed: {}",
                    failure.chain_message()
                );
            }
            Event::DecoderSelected {
                content_type,
                matched,
                strategy,
            } => {
                tracing::debug!(content_type, matched, strategy, "Selected response decoder");
            }
            Event::DownloadStarted { url, directory } => {
                tracing::info!(%url, directory = %directory.display(), "Download started");
            }
            Event::DownloadFinished { url, path, bytes } => {
                tracing::info!(%url, path = %path.display(), bytes, "Download finished");
            }
        }
    }
}
