//! Caller-facing request descriptor and its builder helpers.

use std::io;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use tokio_stream::Stream;
use url::Url;

use super::body::{BodyContent, BodyError, RequestBody};

/// Media type used by [`Request::json`].
pub const JSON_MEDIA_TYPE: &str = "application/json";
/// Media type used by [`Request::xml`].
pub const XML_MEDIA_TYPE: &str = "application/xml";
/// Media type used by [`Request::form`].
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
/// Media type used by [`Request::with_text`].
pub const TEXT_MEDIA_TYPE: &str = "text/plain; charset=utf-8";

/// Description of one logical request.
///
/// Built with the `with_*` helpers and then handed, by value, to the
/// client. Query parameters and headers are name-to-value mappings:
/// setting a name again replaces the earlier value (header names compare
/// case-insensitively).
///
/// # Example
///
/// ```
/// use resilient_http::request::Request;
///
/// let request = Request::parse("https://api.example.com/search")
///     .unwrap()
///     .with_query("q", "hello world")
///     .with_header("Accept", "application/json");
///
/// assert_eq!(request.method(), http::Method::GET);
/// assert_eq!(request.query(), [("q".to_string(), "hello world".to_string())]);
/// ```
#[derive(Debug)]
pub struct Request {
    url: Url,
    method: Method,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl Request {
    /// Creates a GET request for the given absolute URL.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Parses the URL and creates a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute URL.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Url::parse(url).map(Self::new)
    }

    /// Creates a GET request.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self::new(url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: Url) -> Self {
        Self::new(url).with_method(Method::POST)
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets a query parameter, replacing an earlier value for the same name.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.query.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.query.push((name, value)),
        }
        self
    }

    /// Sets a header, replacing an earlier value for the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Attaches an already materialized body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches raw bytes with an optional media type.
    #[must_use]
    pub fn with_bytes(self, bytes: impl Into<Bytes>, media_type: Option<&str>) -> Self {
        self.with_body(RequestBody::bytes(bytes, media_type))
    }

    /// Attaches UTF-8 text as `text/plain`.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_bytes(text.into(), Some(TEXT_MEDIA_TYPE))
    }

    /// Attaches a streaming body.
    ///
    /// The stream is read to completion once before the first attempt so
    /// that retries resend the full content.
    #[must_use]
    pub fn with_stream<S>(self, stream: S, media_type: Option<&str>) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        self.with_body(RequestBody::new(
            BodyContent::Stream(Box::pin(stream)),
            media_type.map(str::to_owned),
        ))
    }

    /// Serializes `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::Json`] if serialization fails.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, BodyError> {
        let body = serde_json::to_vec(value)?;
        Ok(self.with_bytes(body, Some(JSON_MEDIA_TYPE)))
    }

    /// Serializes `value` as an XML body.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::Xml`] if serialization fails.
    pub fn xml<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, BodyError> {
        let body = quick_xml::se::to_string(value).map_err(|e| BodyError::Xml(e.to_string()))?;
        Ok(self.with_bytes(body, Some(XML_MEDIA_TYPE)))
    }

    /// Encodes the pairs as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn form<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.with_bytes(body, Some(FORM_MEDIA_TYPE))
    }

    /// Returns the target URL, without the descriptor's query parameters.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method.clone()
    }

    /// Returns the query parameters in insertion order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub(crate) fn into_parts(self) -> RequestParts {
        RequestParts {
            url: self.url,
            method: self.method,
            query: self.query,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// Owned pieces of a [`Request`], consumed by the preparer.
pub(crate) struct RequestParts {
    pub url: Url,
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}
