//! The retry/cancellation state machine.

use tokio_util::sync::CancellationToken;
use url::Url;

use super::RetryPolicy;
use crate::observe::{Event, Observer, RetryReason};
use crate::outcome::{ErrorKind, Failure, Outcome};
use crate::request::PreparedRequest;
use crate::time::Sleeper;
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Drives one logical send through as many physical attempts as the
/// policy allows.
///
/// Borrows everything it needs, so one engine can be built per call
/// without copying configuration. Concurrent sends share the transport
/// and nothing else.
///
/// # Attempt classification
///
/// | Attempt result                 | Outcome                                   |
/// |--------------------------------|-------------------------------------------|
/// | 2xx                            | `Success`                                 |
/// | cancellation token triggered   | `Cancelled`, checked before anything else |
/// | timeout                        | retry, else `Failed(Timeout, 408)`        |
/// | transient status               | retry, else `Failed(TransientServerError)`|
/// | other non-2xx status           | `Failed(NonTransientServerError)`         |
/// | other transport error          | `Failed(TransportError, 500)`             |
///
/// With [`Engine::buffer_body`] set, a 2xx body is read inside the same
/// timeout and cancellation race as the exchange itself, so a stalled
/// body counts as a timed-out attempt.
#[derive(Debug)]
pub struct Engine<'a, H, S> {
    client: &'a H,
    sleeper: &'a S,
    policy: &'a RetryPolicy,
    observer: &'a dyn Observer,
    buffer_body: bool,
}

impl<'a, H, S> Engine<'a, H, S> {
    /// Creates an engine over the given collaborators.
    #[must_use]
    pub const fn new(
        client: &'a H,
        sleeper: &'a S,
        policy: &'a RetryPolicy,
        observer: &'a dyn Observer,
    ) -> Self {
        Self {
            client,
            sleeper,
            policy,
            observer,
            buffer_body: false,
        }
    }

    /// Reads successful bodies into memory as part of each attempt.
    #[must_use]
    pub const fn buffer_body(mut self, buffer: bool) -> Self {
        self.buffer_body = buffer;
        self
    }

    /// Returns the retry policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        self.policy
    }
}

impl<H: HttpClient, S: Sleeper> Engine<'_, H, S> {
    /// Sends `prepared`, retrying timeouts and transient statuses.
    ///
    /// The body is read to completion before the first attempt; every
    /// attempt then sends its own [`HttpRequest::duplicate`] of the
    /// buffered message and releases it before the next one starts.
    ///
    /// The successful response is returned with its body unread unless
    /// [`Engine::buffer_body`] is set.
    pub async fn send(
        &self,
        prepared: PreparedRequest,
        cancel: &CancellationToken,
    ) -> Outcome<HttpResponse> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = prepared;

        self.observer.on_event(&Event::RequestStarted {
            method: &method,
            url: &url,
        });

        let body = match body {
            None => None,
            Some(content) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return self.cancelled(&url),
                    result = content.into_bytes() => match result {
                        Ok(bytes) => Some(bytes),
                        Err(e) => {
                            let failure = Failure::of(
                                ErrorKind::TransportError,
                                "Failed to read request body",
                            )
                            .with_source(e);
                            return self.fail(&url, failure);
                        }
                    },
                }
            }
        };

        let mut original = HttpRequest::new(method, url);
        original.headers = headers;
        original.body = body;

        self.run(&original, cancel).await
    }

    async fn run(&self, original: &HttpRequest, cancel: &CancellationToken) -> Outcome<HttpResponse> {
        let url = &original.url;
        let mut retries_used = 0;

        loop {
            let attempt = retries_used + 1;

            if cancel.is_cancelled() {
                return self.cancelled(url);
            }

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return self.cancelled(url),
                result = self.attempt(original.duplicate()) => result,
            };

            let reason = match self.classify(result, url, attempt, cancel) {
                Step::Done(outcome) => return outcome,
                Step::Retry(reason) => reason,
            };

            if !self.policy.should_retry(retries_used) {
                return self.fail(url, exhausted(reason, attempt));
            }

            retries_used += 1;
            let delay = self.policy.delay_for_retry(retries_used);
            self.observer.on_event(&Event::RetryScheduled {
                url,
                next_attempt: retries_used + 1,
                delay,
                reason,
            });

            tokio::select! {
                biased;
                () = cancel.cancelled() => return self.cancelled(url),
                () = self.sleeper.sleep(delay) => {}
            }
        }
    }

    /// Decides what an attempt's result means for the logical send.
    fn classify(
        &self,
        result: Result<HttpResponse, HttpError>,
        url: &Url,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> Step {
        match result {
            Ok(response) if response.is_success() => {
                let status = response.status.as_u16();
                self.observer.on_event(&Event::RequestCompleted {
                    url,
                    status,
                    attempts: attempt,
                });
                Step::Done(Outcome::success(response, status))
            }
            _ if cancel.is_cancelled() => Step::Done(self.cancelled(url)),
            Ok(response) => {
                let status = response.status.as_u16();
                if self.policy.is_transient(status) {
                    return Step::Retry(RetryReason::TransientStatus(status));
                }
                let failure = Failure::new(
                    ErrorKind::NonTransientServerError,
                    status,
                    format!("Request failed with status {}", response.status),
                );
                Step::Done(self.fail(url, failure))
            }
            Err(HttpError::Timeout) => {
                self.observer
                    .on_event(&Event::AttemptTimedOut { url, attempt });
                Step::Retry(RetryReason::Timeout)
            }
            Err(e @ HttpError::InvalidUrl(_)) => {
                let failure =
                    Failure::of(ErrorKind::InvalidRequest, "Invalid request URL").with_source(e);
                Step::Done(self.fail(url, failure))
            }
            Err(e) => {
                let failure = Failure::of(ErrorKind::TransportError, "Request failed").with_source(e);
                Step::Done(self.fail(url, failure))
            }
        }
    }

    /// Executes one physical attempt under the per-attempt timeout.
    async fn attempt(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let exchange = async {
            match self.client.request(request).await {
                Ok(response) if self.buffer_body && response.is_success() => {
                    response.buffered().await
                }
                other => other,
            }
        };

        match self.policy.timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange)
                .await
                .unwrap_or(Err(HttpError::Timeout)),
            None => exchange.await,
        }
    }

    fn cancelled<T>(&self, url: &Url) -> Outcome<T> {
        self.observer.on_event(&Event::Cancelled { url });
        Outcome::cancelled()
    }

    fn fail<T>(&self, url: &Url, failure: Failure) -> Outcome<T> {
        self.observer.on_event(&Event::RequestFailed {
            url,
            failure: &failure,
        });
        failure.into()
    }
}

/// What the attempt loop does next.
enum Step {
    Done(Outcome<HttpResponse>),
    Retry(RetryReason),
}

/// Builds the final failure once the retry budget is spent.
fn exhausted(reason: RetryReason, attempts: u32) -> Failure {
    match reason {
        RetryReason::Timeout => Failure::of(
            ErrorKind::Timeout,
            format!("Request timed out after {attempts} attempt(s)"),
        ),
        RetryReason::TransientStatus(status) => Failure::new(
            ErrorKind::TransientServerError,
            status,
            format!("Request failed with transient status {status} after {attempts} attempt(s)"),
        ),
    }
}

