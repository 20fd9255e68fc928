//! Shared test doubles: scripted transport, recording sleeper and observer.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio_stream::StreamExt;

use crate::observe::{Event, Observer};
use crate::time::Sleeper;
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse, ResponseBody};

/// What the mock transport does for one physical attempt.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status and an empty body.
    Status(u16),
    /// Respond with a status, content type and body.
    Body {
        status: u16,
        content_type: Option<&'static str>,
        body: Bytes,
    },
    /// Respond with a status and extra headers.
    Headers {
        status: u16,
        headers: Vec<(&'static str, &'static str)>,
        body: Bytes,
    },
    /// Respond with a body whose stream fails after the given prefix.
    BrokenBody { status: u16, prefix: Bytes },
    /// Respond with headers and a body that stops after the given prefix.
    StalledBody { status: u16, prefix: Bytes },
    /// Fail with a transport-level timeout.
    Timeout,
    /// Fail with a connection error.
    ConnectionRefused,
    /// Never answer within any reasonable timeout.
    Hang,
}

impl Reply {
    pub fn json(status: u16, body: &'static str) -> Self {
        Self::Body {
            status,
            content_type: Some("application/json"),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    pub fn typed(status: u16, content_type: &'static str, body: &'static [u8]) -> Self {
        Self::Body {
            status,
            content_type: Some(content_type),
            body: Bytes::from_static(body),
        }
    }
}

/// A captured physical request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: http::Method,
    pub url: url::Url,
    pub headers: http::HeaderMap,
    pub body: Option<Bytes>,
}

/// Mock transport replaying a script of replies.
///
/// The last reply repeats once the script is exhausted.
#[derive(Debug)]
pub struct MockClient {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    requests: Mutex<Vec<Captured>>,
    calls: AtomicUsize,
}

impl MockClient {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(reply: Reply) -> Self {
        Self::new([reply])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Captured {
        self.requests().pop().expect("no request was sent")
    }

    fn next_reply(&self) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = replies.pop_front() {
            *last = Some(reply.clone());
            reply
        } else {
            last.clone().expect("mock client has no replies")
        }
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(Captured {
            method: req.method.clone(),
            url: req.url.clone(),
            headers: req.headers.clone(),
            body: req.body.clone(),
        });

        let reply = self.next_reply();
        match reply {
            Reply::Status(status) => Ok(response(status, Vec::new(), ResponseBody::empty())),
            Reply::Body {
                status,
                content_type,
                body,
            } => {
                let headers = content_type
                    .map(|ct| vec![("content-type", ct)])
                    .unwrap_or_default();
                Ok(response(status, headers, streamed(body)))
            }
            Reply::Headers {
                status,
                headers,
                body,
            } => Ok(response(status, headers, streamed(body))),
            Reply::BrokenBody { status, prefix } => {
                let chunks = vec![
                    Ok(prefix),
                    Err(HttpError::Body(Box::new(std::io::Error::other(
                        "connection reset",
                    )))),
                ];
                Ok(response(
                    status,
                    Vec::new(),
                    ResponseBody::from_stream(tokio_stream::iter(chunks)),
                ))
            }
            Reply::StalledBody { status, prefix } => {
                let chunks = tokio_stream::iter([Ok(prefix)]).chain(tokio_stream::pending());
                Ok(response(
                    status,
                    vec![("content-type", "application/json")],
                    ResponseBody::from_stream(chunks),
                ))
            }
            Reply::Timeout => Err(HttpError::Timeout),
            Reply::ConnectionRefused => Err(HttpError::Connection(Box::new(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ))),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(response(200, Vec::new(), ResponseBody::empty()))
            }
        }
    }
}

fn response(
    status: u16,
    headers: Vec<(&'static str, &'static str)>,
    body: ResponseBody,
) -> HttpResponse {
    let mut map = http::HeaderMap::new();
    for (name, value) in headers {
        map.append(
            http::HeaderName::from_static(name),
            http::HeaderValue::from_static(value),
        );
    }
    HttpResponse::new(http::StatusCode::from_u16(status).unwrap(), map, body)
}

/// Splits the body into two chunks so decoders see a real stream.
fn streamed(body: Bytes) -> ResponseBody {
    let mid = body.len() / 2;
    let chunks: Vec<Result<Bytes, HttpError>> = vec![Ok(body.slice(..mid)), Ok(body.slice(mid..))];
    ResponseBody::from_stream(tokio_stream::iter(chunks))
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Observer that records the debug form of every event.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the variant names of the recorded events, in order.
    pub fn names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| {
                event
                    .split(|c: char| c == ' ' || c == '(')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| *n == name).count()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &Event<'_>) {
        self.events.lock().unwrap().push(format!("{event:?}"));
    }
}
