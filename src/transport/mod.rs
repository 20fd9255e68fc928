//! Transport layer: the boundary to the platform HTTP client.
//!
//! This module provides types and traits for:
//! - Physical HTTP requests ([`HttpRequest`]) and their retry copies
//! - HTTP responses with buffered or streaming bodies ([`HttpResponse`], [`ResponseBody`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Selecting among pre-configured transports ([`ClientRegistry`])

mod client;
mod error;
mod http;
mod registry;

#[cfg(test)]
mod http_tests;

pub use client::ReqwestClient;
pub use error::HttpError;
pub use http::{BodyStream, HttpClient, HttpRequest, HttpResponse, ResponseBody};
pub use registry::ClientRegistry;
