//! resilient-http: an HTTP client layer with retries, cancellation and typed decoding
//!
//! A library for sending outbound HTTP requests without repeating
//! retry, timeout and deserialization boilerplate. Requests are retried
//! with linear backoff on timeouts and transient statuses, responses are
//! decoded by content type, downloads land under collision-safe names, and
//! every operation reports a uniform [`Outcome`](outcome::Outcome).

pub mod config;
pub mod decode;
pub mod download;
pub mod engine;
pub mod observe;
pub mod outcome;
pub mod request;
pub mod rest;
pub mod time;
pub mod transport;

#[cfg(test)]
mod test_fixtures;
