//! Result envelope shared by every stage of the request pipeline.
//!
//! Stages never let errors escape as panics or raw transport errors:
//! they return an [`Outcome`] which is either a success carrying the
//! payload, a cancellation, or a failure described by a [`Failure`].

mod envelope;
mod failure;


pub use envelope::{EmptyOutcome, Outcome, Status};
pub use failure::{BoxError, ErrorKind, Failure, status_code};

/// Unwraps a successful outcome or returns its failure from the enclosing
/// function, converted into that function's outcome type.
macro_rules! try_outcome {
    ($outcome:expr) => {
        match $outcome.into_parts() {
            Ok((payload, _)) => payload,
            Err(failure) => return $crate::outcome::Outcome::from(failure),
        }
    };
}

pub(crate) use try_outcome;
