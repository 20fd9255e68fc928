//! Request descriptors and their preparation for the transport.
//!
//! - [`Request`]: what the caller wants to send, built with helpers
//!   for JSON, XML, form, text, raw byte and streaming bodies
//! - [`prepare`]: final URL, merged headers, attached body

mod body;
mod descriptor;
mod prepare;

#[cfg(test)]
mod descriptor_tests;

pub use body::{BodyContent, BodyError, ByteStream, RequestBody};
pub use descriptor::{FORM_MEDIA_TYPE, JSON_MEDIA_TYPE, Request, TEXT_MEDIA_TYPE, XML_MEDIA_TYPE};
pub use prepare::{PreparedRequest, prepare};
