//! resilient-http: HTTP requests with retries, timeouts and typed decoding
//!
//! Entry point for the resilient-http application.

use resilient_http::config::{Cli, ValidatedConfig};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};
use run::RunError;

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::debug!("{config}");

    run_application(config)
}

/// Runs the requested action with the given configuration.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: ValidatedConfig) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    let cancel = CancellationToken::new();
    runtime.spawn(run::cancel_on_shutdown(cancel.clone()));

    match runtime.block_on(run::execute(config, &cancel)) {
        Ok(()) => exit_code::SUCCESS,
        Err(RunError::Cancelled) => {
            tracing::warn!("Cancelled");
            exit_code::cancelled()
        }
        Err(RunError::Config(e)) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
        Err(e) => {
            tracing::error!("{e}");
            exit_code::runtime_error()
        }
    }
}
