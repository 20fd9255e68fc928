//! Application execution logic.
//!
//! This module runs the validated action: prints a response body,
//! downloads a file, or writes the configuration template.

use std::io::Write;
use std::sync::Arc;

use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use resilient_http::config::{Action, ConfigError, ValidatedConfig, write_default_config};
use resilient_http::observe::TracingObserver;
use resilient_http::outcome::{ErrorKind, Failure, Outcome};
use resilient_http::rest::RestClient;
use resilient_http::time::Sleeper;
use resilient_http::transport::{HttpClient, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The user interrupted the request.
    #[error("Request cancelled")]
    Cancelled,

    /// The request failed after all retries.
    #[error("Request failed (status {status}): {message}")]
    Request {
        /// Status code reported by the failing stage
        status: u16,
        /// Message including every nested cause
        message: String,
        /// The failure itself
        #[source]
        source: Failure,
    },

    /// Writing to stdout failed.
    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// Writing the configuration template failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Executes the configured action against the network.
///
/// # Errors
///
/// Returns an error if the request fails, is cancelled, or its result
/// cannot be written.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it performs real
/// network I/O; [`perform`] holds the testable logic.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig, cancel: &CancellationToken) -> Result<(), RunError> {
    let client = RestClient::new(ReqwestClient::new())
        .with_config(config.client)
        .with_observer(Arc::new(TracingObserver));

    let stdout = std::io::stdout();
    perform(&client, config.action, cancel, &mut stdout.lock()).await
}

/// Runs `action` with `client`, writing results to `out`.
async fn perform<H, S, W>(
    client: &RestClient<H, S>,
    action: Action,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<(), RunError>
where
    H: HttpClient,
    S: Sleeper,
    W: Write,
{
    match action {
        Action::Print(request) => {
            let body = finish(client.send_text(request, cancel).await)?;
            writeln!(out, "{body}").map_err(RunError::Output)
        }
        Action::Download { request, directory } => {
            let path = finish(client.download(request, &directory, cancel).await)?;
            writeln!(out, "{}", path.display()).map_err(RunError::Output)
        }
        Action::Init { output } => {
            write_default_config(&output)?;
            writeln!(out, "Configuration template written to: {}", output.display())
                .map_err(RunError::Output)
        }
    }
}

/// Converts a final outcome into the binary's error type.
fn finish<T>(outcome: Outcome<T>) -> Result<T, RunError> {
    let message = outcome.error_chain();
    match outcome.into_result() {
        Ok(payload) => Ok(payload),
        Err(failure) if failure.kind() == ErrorKind::Cancelled => Err(RunError::Cancelled),
        Err(failure) => Err(RunError::Request {
            status: failure.status_code(),
            message,
            source: failure,
        }),
    }
}

/// Cancels `cancel` when Ctrl+C is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn cancel_on_shutdown(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Interrupt received, cancelling...");
            cancel.cancel();
        }
        Err(e) => tracing::warn!("Failed to install Ctrl+C handler: {e}"),
    }
}
