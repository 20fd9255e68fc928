//! Turns a [`Request`] into a transport-ready message.

use std::collections::BTreeMap;

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use super::body::BodyContent;
use super::descriptor::Request;
use crate::observe::{Event, Observer};
use crate::outcome::{ErrorKind, Failure, Outcome, status_code};

/// Characters escaped in query keys and values: everything except the
/// RFC 3986 unreserved set.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A request with its final URL and merged headers.
///
/// The body is still in the form the caller supplied; the engine buffers
/// it once before the first physical attempt.
#[derive(Debug)]
pub struct PreparedRequest {
    /// Request method.
    pub method: Method,
    /// Final URL including the encoded query string.
    pub url: Url,
    /// Merged headers.
    pub headers: HeaderMap,
    /// Body content, if any.
    pub body: Option<BodyContent>,
}

/// Prepares `request` for sending.
///
/// Common headers apply only where the request does not set the same
/// name; names compare case-insensitively. Header values are accepted
/// permissively: only bytes that can never appear on the wire are
/// rejected. When the body declares a media type and no `Content-Type`
/// header is set, the media type becomes the `Content-Type`.
///
/// No I/O happens here. Malformed names or values yield a failed outcome
/// of kind [`ErrorKind::InvalidRequest`] with the parse error attached.
pub fn prepare(
    request: Request,
    common_headers: &BTreeMap<String, String>,
    observer: &dyn Observer,
) -> Outcome<PreparedRequest> {
    let parts = request.into_parts();

    let url = with_query(parts.url, &parts.query);

    let mut headers = HeaderMap::with_capacity(parts.headers.len() + common_headers.len());
    for (name, value) in &parts.headers {
        match parse_header(name, value) {
            Ok((name, value)) => {
                headers.insert(name, value);
            }
            Err(failure) => return failure.into(),
        }
    }
    for (name, value) in common_headers {
        match parse_header(name, value) {
            Ok((name, value)) => {
                if !headers.contains_key(&name) {
                    headers.insert(name, value);
                }
            }
            Err(failure) => return failure.into(),
        }
    }

    let body = match parts.body {
        Some(body) => {
            let (content, media_type) = body.into_parts();
            match media_type {
                Some(media_type) if !headers.contains_key(header::CONTENT_TYPE) => {
                    match HeaderValue::from_str(&media_type) {
                        Ok(value) => {
                            headers.insert(header::CONTENT_TYPE, value);
                        }
                        Err(e) => {
                            return invalid(format!("Invalid body media type '{media_type}'"), e)
                                .into();
                        }
                    }
                }
                _ => {}
            }
            Some(content)
        }
        None => None,
    };

    observer.on_event(&Event::Prepared {
        url: &url,
        header_count: headers.len(),
    });

    Outcome::success(
        PreparedRequest {
            method: parts.method,
            url,
            headers,
            body,
        },
        status_code::NOT_APPLICABLE,
    )
}

/// Appends percent-encoded `key=value` pairs to the URL's query.
fn with_query(mut url: Url, query: &[(String, String)]) -> Url {
    if query.is_empty() {
        return url;
    }

    let encoded = query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let combined = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded,
    };
    url.set_query(Some(&combined));
    url
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), Failure> {
    let header_name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|e| invalid(format!("Invalid header name '{name}'"), e))?;
    let header_value = HeaderValue::from_bytes(value.as_bytes())
        .map_err(|e| invalid(format!("Invalid value for header '{name}'"), e))?;
    Ok((header_name, header_value))
}

fn invalid(message: String, source: impl std::error::Error + Send + Sync + 'static) -> Failure {
    Failure::of(ErrorKind::InvalidRequest, message).with_source(source)
}
