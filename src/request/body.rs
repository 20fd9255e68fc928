//! Materialized request bodies.

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio_stream::{Stream, StreamExt};

/// Boxed stream of request body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Error raised by the body builder helpers.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The value could not be serialized as JSON.
    #[error("Failed to serialize JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The value could not be serialized as XML.
    #[error("Failed to serialize XML body: {0}")]
    Xml(String),
}

/// Opaque body content.
pub enum BodyContent {
    /// Content already held in memory.
    Bytes(Bytes),
    /// Content produced by a live stream. Read once, when the request is sent.
    Stream(ByteStream),
}

impl BodyContent {
    /// Reads the content to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by a streaming source.
    pub async fn into_bytes(self) -> io::Result<Bytes> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Stream(mut stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buffer.extend_from_slice(&chunk?);
                }
                Ok(buffer.freeze())
            }
        }
    }
}

impl fmt::Debug for BodyContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Body content plus its declared media type.
#[derive(Debug)]
pub struct RequestBody {
    content: BodyContent,
    media_type: Option<String>,
}

impl RequestBody {
    /// Creates a body from content and an optional media type.
    #[must_use]
    pub fn new(content: BodyContent, media_type: Option<String>) -> Self {
        Self {
            content,
            media_type,
        }
    }

    /// Creates an in-memory body.
    #[must_use]
    pub fn bytes(bytes: impl Into<Bytes>, media_type: Option<&str>) -> Self {
        Self::new(BodyContent::Bytes(bytes.into()), media_type.map(str::to_owned))
    }

    /// Returns the content.
    #[must_use]
    pub const fn content(&self) -> &BodyContent {
        &self.content
    }

    /// Returns the declared media type.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Splits the body into content and media type.
    #[must_use]
    pub fn into_parts(self) -> (BodyContent, Option<String>) {
        (self.content, self.media_type)
    }
}
