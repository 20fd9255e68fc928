//! Client facade: prepare, execute with retries, then decode or download.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ClientConfig;
use crate::decode::ResponseDecoder;
use crate::download::{prepare_directory, save};
use crate::engine::Engine;
use crate::observe::{Event, NoopObserver, Observer};
use crate::outcome::{ErrorKind, Failure, Outcome, try_outcome};
use crate::request::{Request, prepare};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{ClientRegistry, HttpClient, HttpResponse};

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;

/// HTTP client with retries, timeouts, cancellation and typed decoding.
///
/// Every operation takes a [`CancellationToken`]; pass
/// `&CancellationToken::new()` when the call should never be cancelled.
/// Failures never panic or escape as errors: each operation returns an
/// [`Outcome`] and the first failing stage decides it.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper implementation for retry delays (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```no_run
/// use resilient_http::rest::RestClient;
/// use resilient_http::transport::ReqwestClient;
/// use tokio_util::sync::CancellationToken;
/// use url::Url;
///
/// # async fn run() {
/// let client = RestClient::new(ReqwestClient::new());
/// let url = Url::parse("https://api.example.com/status").unwrap();
///
/// let outcome = client.get_text(url, &CancellationToken::new()).await;
/// if let Some(body) = outcome.payload() {
///     println!("{body}");
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct RestClient<H, S = TokioSleeper> {
    clients: ClientRegistry<H>,
    sleeper: S,
    config: ClientConfig,
    observer: Arc<dyn Observer>,
}

impl<H> RestClient<H, TokioSleeper> {
    /// Creates a client over a single transport with default configuration.
    #[must_use]
    pub fn new(client: H) -> Self {
        Self::with_registry(ClientRegistry::new(client))
    }

    /// Creates a client over a set of named transports.
    ///
    /// [`ClientConfig::client_name`] selects which one is used.
    #[must_use]
    pub fn with_registry(clients: ClientRegistry<H>) -> Self {
        Self {
            clients,
            sleeper: TokioSleeper,
            config: ClientConfig::default(),
            observer: Arc::new(NoopObserver),
        }
    }
}

impl<H, S> RestClient<H, S> {
    /// Sets a custom sleeper for retry delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> RestClient<H, S2> {
        RestClient {
            clients: self.clients,
            sleeper,
            config: self.config,
            observer: self.observer,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the observer that receives pipeline events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the configuration for changes between requests.
    pub const fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// Returns the registered transports.
    #[must_use]
    pub const fn clients(&self) -> &ClientRegistry<H> {
        &self.clients
    }

    fn decoder(&self) -> ResponseDecoder<'_> {
        ResponseDecoder::new(&self.config.decoders, self.observer.as_ref())
    }
}

impl<H: HttpClient, S: Sleeper> RestClient<H, S> {
    /// Sends `request` and decodes the body by its content type.
    ///
    /// The first failing stage decides the outcome: preparation
    /// (`InvalidRequest`), execution (`Cancelled`, `Timeout`, server and
    /// transport errors) or decoding (`UnhandledContentType`, `DecodeError`).
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Outcome<T> {
        let response = try_outcome!(self.execute(request, cancel, true).await);
        self.decoder().decode(response).await
    }

    /// Sends `request` and returns the body as UTF-8 text.
    pub async fn send_text(&self, request: Request, cancel: &CancellationToken) -> Outcome<String> {
        let response = try_outcome!(self.execute(request, cancel, true).await);
        self.decoder().decode_text(response).await
    }

    /// Sends `request` and returns the raw body.
    pub async fn send_bytes(&self, request: Request, cancel: &CancellationToken) -> Outcome<Bytes> {
        let response = try_outcome!(self.execute(request, cancel, true).await);
        self.decoder().decode_bytes(response).await
    }

    /// Sends `request` and returns the body as a readable in-memory stream.
    pub async fn send_stream(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Outcome<Cursor<Bytes>> {
        let response = try_outcome!(self.execute(request, cancel, true).await);
        self.decoder().decode_stream(response).await
    }

    /// Sends `request` and discards the body.
    pub async fn send_empty(&self, request: Request, cancel: &CancellationToken) -> Outcome<()> {
        let response = try_outcome!(self.execute(request, cancel, true).await);
        self.decoder().decode_empty(response).await
    }

    /// Sends a GET request to `url` and decodes the body by its content type.
    pub async fn get<T: DeserializeOwned>(&self, url: Url, cancel: &CancellationToken) -> Outcome<T> {
        self.send(Request::get(url), cancel).await
    }

    /// Sends a GET request to `url` and returns the body as text.
    pub async fn get_text(&self, url: Url, cancel: &CancellationToken) -> Outcome<String> {
        self.send_text(Request::get(url), cancel).await
    }

    /// Sends `request` and saves the body under `directory`.
    ///
    /// The directory is created if missing. The file name comes from
    /// `Content-Disposition`, then the URL path, then a random name, and
    /// an existing file is never overwritten: `name(1).ext`, `name(2).ext`
    /// and so on are tried instead. Returns the final path.
    pub async fn download(
        &self,
        request: Request,
        directory: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Outcome<PathBuf> {
        let directory = directory.as_ref();
        try_outcome!(prepare_directory(directory).await);

        let url = request.url().clone();
        let response = try_outcome!(self.execute(request, cancel, false).await);
        save(response, &url, directory, cancel, self.observer.as_ref()).await
    }

    /// Selects the transport, prepares the message and runs the retry loop.
    ///
    /// With `buffer_body` the successful body is read within the attempt,
    /// under its timeout and cancellation; otherwise it is left streaming.
    async fn execute(
        &self,
        request: Request,
        cancel: &CancellationToken,
        buffer_body: bool,
    ) -> Outcome<HttpResponse> {
        let observer = self.observer.as_ref();
        let url = request.url().clone();

        let name = self.config.client_name.as_deref();
        let Some(client) = self.clients.get(name) else {
            let failure = Failure::of(
                ErrorKind::InvalidRequest,
                format!("No HTTP client registered as '{}'", name.unwrap_or_default()),
            );
            observer.on_event(&Event::RequestFailed {
                url: &url,
                failure: &failure,
            });
            return failure.into();
        };

        let prepared = match prepare(request, &self.config.common_headers, observer) {
            Outcome::Failed(failure) => {
                observer.on_event(&Event::RequestFailed {
                    url: &url,
                    failure: &failure,
                });
                return Outcome::Failed(failure);
            }
            outcome => try_outcome!(outcome),
        };

        Engine::new(client, &self.sleeper, &self.config.retry, observer)
            .buffer_body(buffer_body)
            .send(prepared, cancel)
            .await
    }
}
