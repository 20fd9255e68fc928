//! Execution engine: retry with linear backoff, per-attempt timeouts and
//! cancellation.
//!
//! # Architecture
//!
//! - [`RetryPolicy`]: how many retries, how long each attempt may take,
//!   how long to wait between attempts, which statuses are transient
//! - [`Engine`]: runs the attempt loop over an
//!   [`HttpClient`](crate::transport::HttpClient) and a
//!   [`Sleeper`](crate::time::Sleeper), reporting to an
//!   [`Observer`](crate::observe::Observer)
//!
//! Cancellation always wins: a triggered token yields
//! [`Outcome::Cancelled`](crate::outcome::Outcome::Cancelled) even when a
//! timeout would also explain why the attempt ended.

mod executor;
mod retry;

#[cfg(test)]
mod retry_tests;

pub use executor::Engine;
pub use retry::RetryPolicy;
