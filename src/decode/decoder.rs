//! Turns raw responses into typed payloads.

use std::io::Cursor;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::de::value::BytesDeserializer;

use super::{DecodeStrategy, Decoders, from_value};
use crate::observe::{Event, Observer};
use crate::outcome::{BoxError, ErrorKind, Failure, Outcome, status_code, try_outcome};
use crate::transport::{HttpResponse, ResponseBody};

/// Content type assumed when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Decodes successful responses.
///
/// [`ResponseDecoder::decode`] picks a [`DecodeStrategy`] from the
/// response content type. The other methods ignore the content type and
/// produce text, bytes, an in-memory stream, or nothing.
///
/// Every method reads the body to completion and releases the response
/// before returning.
#[derive(Debug, Clone, Copy)]
pub struct ResponseDecoder<'a> {
    decoders: &'a Decoders,
    observer: &'a dyn Observer,
}

impl<'a> ResponseDecoder<'a> {
    /// Creates a decoder over a content-type mapping.
    #[must_use]
    pub const fn new(decoders: &'a Decoders, observer: &'a dyn Observer) -> Self {
        Self { decoders, observer }
    }

    /// Decodes the body according to its content type.
    ///
    /// A missing `Content-Type` is treated as [`DEFAULT_CONTENT_TYPE`].
    /// Fails with [`ErrorKind::UnhandledContentType`] when no decoder
    /// matches and with [`ErrorKind::DecodeError`] when the body does not
    /// fit `T`; both report status 500.
    pub async fn decode<T: DeserializeOwned>(&self, response: HttpResponse) -> Outcome<T> {
        let status = response.status.as_u16();
        let content_type = response
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let Some((matched, strategy)) = self.decoders.find(&content_type) else {
            return Failure::of(
                ErrorKind::UnhandledContentType,
                format!("No decoder registered for content type '{content_type}'"),
            )
            .into();
        };
        self.observer.on_event(&Event::DecoderSelected {
            content_type: &content_type,
            matched,
            strategy: strategy.name(),
        });

        let body = try_outcome!(read_body(response.body).await);
        match decode_with(strategy, &body) {
            Ok(payload) => Outcome::success(payload, status),
            Err(e) => Failure::of(
                ErrorKind::DecodeError,
                format!(
                    "Failed to decode '{content_type}' response as {}",
                    strategy.name()
                ),
            )
            .with_source(e)
            .into(),
        }
    }

    /// Returns the body as UTF-8 text.
    ///
    /// Invalid UTF-8 fails with [`ErrorKind::DecodeError`].
    pub async fn decode_text(&self, response: HttpResponse) -> Outcome<String> {
        let status = response.status.as_u16();
        let body = try_outcome!(read_body(response.body).await);
        match String::from_utf8(body.to_vec()) {
            Ok(text) => Outcome::success(text, status),
            Err(e) => Failure::of(ErrorKind::DecodeError, "Response body is not valid UTF-8")
                .with_source(e)
                .into(),
        }
    }

    /// Returns the body bytes.
    pub async fn decode_bytes(&self, response: HttpResponse) -> Outcome<Bytes> {
        let status = response.status.as_u16();
        let body = try_outcome!(read_body(response.body).await);
        Outcome::success(body, status)
    }

    /// Returns the body as a readable in-memory stream.
    ///
    /// The body is fully buffered, so the stream stays valid after the
    /// response has been released.
    pub async fn decode_stream(&self, response: HttpResponse) -> Outcome<Cursor<Bytes>> {
        self.decode_bytes(response).await.map(Cursor::new)
    }

    /// Reads and discards the body.
    pub async fn decode_empty(&self, response: HttpResponse) -> Outcome<()> {
        self.decode_bytes(response).await.map(drop)
    }
}

async fn read_body(body: ResponseBody) -> Outcome<Bytes> {
    match body.bytes().await {
        Ok(bytes) => Outcome::success(bytes, status_code::NOT_APPLICABLE),
        Err(e) => Failure::of(ErrorKind::TransportError, "Failed to read response body")
            .with_source(e)
            .into(),
    }
}

fn decode_with<T: DeserializeOwned>(strategy: &DecodeStrategy, body: &[u8]) -> Result<T, BoxError> {
    match strategy {
        DecodeStrategy::Json => {
            let value: serde_json::Value = serde_json::from_slice(body)?;
            Ok(from_value(value)?)
        }
        DecodeStrategy::Xml => Ok(quick_xml::de::from_reader(body)?),
        DecodeStrategy::Raw => {
            let deserializer = BytesDeserializer::<serde::de::value::Error>::new(body);
            Ok(T::deserialize(deserializer)?)
        }
        DecodeStrategy::Custom(convert) => {
            let value = (convert.as_ref())(body)?;
            Ok(from_value(value)?)
        }
    }
}
