//! The tagged outcome returned by every pipeline stage.

use std::error::Error;

use super::failure::{ErrorKind, Failure};

/// Coarse status of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation produced a payload.
    Success,
    /// The caller cancelled the operation.
    Cancelled,
    /// The operation failed.
    Failed,
}

/// Result envelope distinguishing success, cancellation and failure.
///
/// The payload lives only in the [`Outcome::Success`] variant, so a
/// cancelled or failed outcome can never expose a usable payload.
///
/// # Example
///
/// ```
/// use resilient_http::outcome::{ErrorKind, Failure, Outcome, Status};
///
/// let ok: Outcome<u32> = Outcome::success(7, 200);
/// assert_eq!(ok.payload(), Some(&7));
///
/// let failed: Outcome<u32> = Failure::of(ErrorKind::Timeout, "timed out").into();
/// assert_eq!(failed.status(), Status::Failed);
/// assert_eq!(failed.status_code(), 408);
/// assert!(failed.payload().is_none());
/// ```
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    /// The operation succeeded.
    Success {
        /// Produced value.
        payload: T,
        /// Status code of the response the payload came from (0 when not applicable).
        status_code: u16,
    },
    /// The caller cancelled the operation.
    Cancelled(Failure),
    /// The operation failed.
    Failed(Failure),
}

/// Outcome of an operation that produces no payload.
pub type EmptyOutcome = Outcome<()>;

impl<T> Outcome<T> {
    /// Creates a successful outcome.
    pub const fn success(payload: T, status_code: u16) -> Self {
        Self::Success {
            payload,
            status_code,
        }
    }

    /// Creates a failed outcome.
    ///
    /// A failure of kind [`ErrorKind::Cancelled`] still produces
    /// [`Outcome::Cancelled`]; use `From<Failure>` for the same routing.
    pub fn failed(failure: Failure) -> Self {
        Self::from(failure)
    }

    /// Creates a cancelled outcome.
    pub fn cancelled() -> Self {
        Self::Cancelled(Failure::cancelled())
    }

    /// Returns the coarse status.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Success { .. } => Status::Success,
            Self::Cancelled(_) => Status::Cancelled,
            Self::Failed(_) => Status::Failed,
        }
    }

    /// Returns true for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the status code (0 when not applicable).
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } => *status_code,
            Self::Cancelled(failure) | Self::Failed(failure) => failure.status_code(),
        }
    }

    /// Returns the message, empty for successful outcomes.
    #[must_use]
    pub fn message(&self) -> &str {
        self.failure().map_or("", Failure::message)
    }

    /// Returns the failure description of a non-success outcome.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success { .. } => None,
            Self::Cancelled(failure) | Self::Failed(failure) => Some(failure),
        }
    }

    /// Returns the failure classification of a non-success outcome.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.failure().map(Failure::kind)
    }

    /// Returns the underlying error of a non-success outcome.
    #[must_use]
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.failure().and_then(Failure::cause)
    }

    /// Returns the payload of a successful outcome.
    #[must_use]
    pub const fn payload(&self) -> Option<&T> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Cancelled(_) | Self::Failed(_) => None,
        }
    }

    /// Consumes the outcome, returning the payload of a successful outcome.
    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Cancelled(_) | Self::Failed(_) => None,
        }
    }

    /// Splits a successful outcome into payload and status code.
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] of a cancelled or failed outcome.
    pub fn into_parts(self) -> Result<(T, u16), Failure> {
        match self {
            Self::Success {
                payload,
                status_code,
            } => Ok((payload, status_code)),
            Self::Cancelled(failure) | Self::Failed(failure) => Err(failure),
        }
    }

    /// Converts into a standard `Result`, dropping the status code.
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] of a cancelled or failed outcome.
    pub fn into_result(self) -> Result<T, Failure> {
        self.into_parts().map(|(payload, _)| payload)
    }

    /// Transforms the payload of a successful outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success {
                payload,
                status_code,
            } => Outcome::Success {
                payload: f(payload),
                status_code,
            },
            Self::Cancelled(failure) => Outcome::Cancelled(failure),
            Self::Failed(failure) => Outcome::Failed(failure),
        }
    }

    /// Runs the next stage on success; otherwise propagates unchanged.
    pub fn and_then<U>(self, next: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Self::Success { payload, .. } => next(payload),
            Self::Cancelled(failure) => Outcome::Cancelled(failure),
            Self::Failed(failure) => Outcome::Failed(failure),
        }
    }

    /// Returns the message concatenated with every nested cause message.
    ///
    /// Empty for successful outcomes. See [`Failure::chain_message`].
    #[must_use]
    pub fn error_chain(&self) -> String {
        self.failure()
            .map(Failure::chain_message)
            .unwrap_or_default()
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        if failure.kind() == ErrorKind::Cancelled {
            Self::Cancelled(failure)
        } else {
            Self::Failed(failure)
        }
    }
}
