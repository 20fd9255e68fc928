//! HTTP request/response types and client trait.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio_stream::{Stream, StreamExt};

use super::HttpError;

/// Boxed stream of response body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// A physical HTTP request, ready to hand to an [`HttpClient`].
///
/// The transport takes the request by value, so each physical attempt
/// consumes one instance. The body is always fully buffered, which makes
/// [`HttpRequest::duplicate`] able to produce any number of identical
/// copies for retries.
#[derive(Debug)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: http::Method,
    /// Target URL
    pub url: url::Url,
    /// Protocol version
    pub version: http::Version,
    /// HTTP headers to send
    pub headers: http::HeaderMap,
    /// Optional request body
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a new HTTP request with the given method and URL.
    ///
    /// Headers are initialized to an empty map and body is `None`.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            version: http::Version::HTTP_11,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Produces a fresh copy for another physical attempt.
    ///
    /// Method, URL, version and every header value are copied verbatim,
    /// without re-validation. The buffered body is shared, so each copy
    /// reads the complete body regardless of what earlier attempts did
    /// with theirs.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let mut headers = http::HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            headers.append(name.clone(), value.clone());
        }

        Self {
            method: self.method.clone(),
            url: self.url.clone(),
            version: self.version,
            headers,
            body: self.body.clone(),
        }
    }
}

/// Body of an [`HttpResponse`].
pub enum ResponseBody {
    /// Body already held in memory.
    Buffered(Bytes),
    /// Body still arriving from the network.
    Streaming(BodyStream),
}

impl ResponseBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Buffered(Bytes::new())
    }

    /// Wraps a chunk stream.
    #[must_use]
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
    {
        Self::Streaming(Box::pin(stream))
    }

    /// Reads the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the underlying stream.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        match self {
            Self::Buffered(bytes) => Ok(bytes),
            Self::Streaming(mut stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buffer.extend_from_slice(&chunk?);
                }
                Ok(buffer.freeze())
            }
        }
    }

    /// Returns the body as a chunk stream.
    #[must_use]
    pub fn into_stream(self) -> BodyStream {
        match self {
            Self::Buffered(bytes) => Box::pin(tokio_stream::once(Ok(bytes))),
            Self::Streaming(stream) => stream,
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Streaming(_) => f.write_str("Streaming"),
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::Buffered(bytes)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffered(bytes.into())
    }
}

impl From<&'static str> for ResponseBody {
    fn from(text: &'static str) -> Self {
        Self::Buffered(Bytes::from_static(text.as_bytes()))
    }
}

/// An HTTP response received from a server.
///
/// Contains the status code, headers, and body of the response. The
/// body may still be streaming; dropping the response releases it.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Response body
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Creates a new HTTP response.
    #[must_use]
    pub fn new(
        status: http::StatusCode,
        headers: http::HeaderMap,
        body: impl Into<ResponseBody>,
    ) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Reads a streaming body into memory, keeping status and headers.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the body stream.
    pub async fn buffered(self) -> Result<Self, HttpError> {
        let Self {
            status,
            headers,
            body,
        } = self;
        Ok(Self {
            status,
            headers,
            body: ResponseBody::Buffered(body.bytes().await?),
        })
    }

    /// Returns the `Content-Type` header, if present and valid ASCII.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }
}

/// Trait for making HTTP requests.
///
/// # Design
///
/// This trait abstracts the HTTP client implementation, enabling:
/// - Dependency injection for testing with mock clients
/// - Swapping HTTP libraries without changing calling code
/// - Several pre-configured instances selected by name
///
/// Timeouts and cancellation are applied by the caller around the
/// returned future, so implementations only need to perform the exchange.
///
/// # Example
///
/// ```ignore
/// use resilient_http::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};
///
/// struct StaticClient;
///
/// impl HttpClient for StaticClient {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), "ok"))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when:
    /// - Network connection fails ([`HttpError::Connection`])
    /// - Request times out ([`HttpError::Timeout`])
    /// - URL is invalid ([`HttpError::InvalidUrl`])
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<H: HttpClient> HttpClient for Arc<H> {
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send {
        (**self).request(req)
    }
}
