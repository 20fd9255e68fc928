//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::Method;
use http::header::{HeaderName, HeaderValue};
use url::Url;

use crate::decode::DecodeStrategy;
use crate::request::Request;

use super::cli::{Cli, Command};
use super::client::ClientConfig;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// What the binary should do once configuration is valid.
#[derive(Debug)]
pub enum Action {
    /// Send the request and print the response body as text.
    Print(Request),
    /// Send the request and save the body under `directory`.
    Download {
        /// Request to send
        request: Request,
        /// Destination directory, created if missing
        directory: PathBuf,
    },
    /// Write the configuration template.
    Init {
        /// Output path for the template
        output: PathBuf,
    },
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Client configuration shared by every request
    pub client: ClientConfig,

    /// Command to run
    pub action: Action,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let retry = &self.client.retry;
        let timeout = retry
            .timeout
            .map_or_else(|| "none".to_string(), |t| format!("{}ms", t.as_millis()));

        write!(
            f,
            "Config {{ action: {}, retries: {}, timeout: {}, interval: {}ms, headers: {}, decoders: {} }}",
            self.action,
            retry.retries,
            timeout,
            retry.interval.as_millis(),
            self.client.common_headers.len(),
            self.client.decoders.len(),
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Print(request) => write!(f, "{} {}", request.method(), request.url()),
            Self::Download { request, directory } => {
                write!(f, "download {} -> {}", request.url(), directory.display())
            }
            Self::Init { output } => write!(f, "init {}", output.display()),
        }
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A URL is invalid or not http(s)
    /// - The method, a header, a query parameter or a status code is invalid
    /// - A decoder names an unknown strategy
    /// - Retries are enabled with a zero retry interval
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let mut client = ClientConfig::new()
            .with_retries(resolve_retries(cli, toml))
            .with_timeout_millis(resolve_timeout_ms(cli, toml))
            .with_retry_interval(resolve_retry_interval(cli, toml)?);

        if let Some(statuses) = toml.and_then(|t| t.client.transient_status_codes.as_ref()) {
            client.retry = client.retry.with_transient_statuses(validate_statuses(statuses)?);
        }

        client.client_name = toml
            .and_then(|t| t.client.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        apply_headers(&mut client, cli, toml)?;
        apply_decoders(&mut client, toml)?;

        Ok(Self {
            client,
            action: resolve_action(&cli.command)?,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path. The
    /// `init` command never reads a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = match &cli.config {
            Some(path) if !cli.is_init() => Some(TomlConfig::load(&expand_home(path))?),
            _ => None,
        };

        Self::from_raw(cli, toml.as_ref())
    }
}

fn resolve_retries(cli: &Cli, toml: Option<&TomlConfig>) -> u32 {
    // Priority: CLI explicit > TOML > default
    cli.retries
        .or_else(|| toml.and_then(|t| t.client.retries))
        .unwrap_or(defaults::RETRIES)
}

fn resolve_timeout_ms(cli: &Cli, toml: Option<&TomlConfig>) -> i64 {
    cli.timeout_ms
        .or_else(|| toml.and_then(|t| t.client.timeout_ms))
        .unwrap_or(defaults::TIMEOUT_MS)
}

fn resolve_retry_interval(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
    let millis = cli
        .retry_interval_ms
        .or_else(|| toml.and_then(|t| t.client.retry_interval_ms))
        .unwrap_or(defaults::RETRY_INTERVAL_MS);

    let retries = resolve_retries(cli, toml);
    if millis == 0 && retries > 0 {
        return Err(ConfigError::InvalidRetry(
            "retry_interval_ms must be greater than 0 when retries are enabled".to_string(),
        ));
    }

    Ok(Duration::from_millis(millis))
}

fn validate_statuses(statuses: &[u16]) -> Result<Vec<u16>, ConfigError> {
    statuses
        .iter()
        .map(|&status| {
            if (100..=599).contains(&status) {
                Ok(status)
            } else {
                Err(ConfigError::InvalidStatusCode(status))
            }
        })
        .collect()
}

fn apply_headers(
    client: &mut ClientConfig,
    cli: &Cli,
    toml: Option<&TomlConfig>,
) -> Result<(), ConfigError> {
    // TOML headers first (CLI can override)
    if let Some(toml) = toml {
        for (name, value) in &toml.headers {
            validate_header(name, value)?;
            client.set_common_header(name.trim(), value.trim());
        }
    }

    for header_str in &cli.headers {
        let (name, value) = parse_header_string(header_str)?;
        validate_header(&name, &value)?;
        client.set_common_header(name, value);
    }

    if let Some(token) = &cli.bearer {
        let value = format!("Bearer {token}");
        validate_header("Authorization", &value)?;
        client.set_common_header("Authorization", value);
    }

    Ok(())
}

fn apply_decoders(client: &mut ClientConfig, toml: Option<&TomlConfig>) -> Result<(), ConfigError> {
    let Some(toml) = toml else {
        return Ok(());
    };

    for (content_type, name) in &toml.decoders {
        let strategy = name
            .parse::<DecodeStrategy>()
            .map_err(|source| ConfigError::UnknownDecoder {
                content_type: content_type.clone(),
                source,
            })?;
        client.decoders.register(content_type.as_str(), strategy);
    }

    Ok(())
}

fn resolve_action(command: &Command) -> Result<Action, ConfigError> {
    match command {
        Command::Get { url, query } => {
            let request = with_query(Request::new(parse_url(url)?), query)?;
            Ok(Action::Print(request))
        }
        Command::Send {
            url,
            method,
            data,
            content_type,
            query,
        } => {
            let method = parse_method(method)?;
            let mut request = with_query(Request::new(parse_url(url)?), query)?.with_method(method);
            if let Some(data) = data {
                request = match content_type {
                    Some(content_type) => {
                        request.with_bytes(data.clone(), Some(content_type.as_str()))
                    }
                    None => request.with_text(data.clone()),
                };
            }
            Ok(Action::Print(request))
        }
        Command::Download { url, dir, query } => Ok(Action::Download {
            request: with_query(Request::new(parse_url(url)?), query)?,
            directory: expand_home(dir),
        }),
        Command::Init { output } => Ok(Action::Init {
            output: expand_home(output),
        }),
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn parse_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s).map_err(|e| ConfigError::InvalidUrl {
        url: s.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidUrl {
            url: s.to_string(),
            reason: format!("unsupported scheme '{scheme}', expected http or https"),
        }),
    }
}

fn parse_method(s: &str) -> Result<Method, ConfigError> {
    s.trim()
        .to_ascii_uppercase()
        .parse::<Method>()
        .map_err(|_| ConfigError::InvalidMethod(s.to_string()))
}

fn with_query(mut request: Request, params: &[String]) -> Result<Request, ConfigError> {
    for param in params {
        let (name, value) = param
            .split_once('=')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| ConfigError::InvalidQuery {
                value: param.clone(),
            })?;
        request = request.with_query(name.trim(), value);
    }
    Ok(request)
}

/// Splits `Key: Value` or `Key=Value` at whichever separator comes first.
fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    let split = s.find([':', '=']).map(|at| (&s[..at], &s[at + 1..]));

    match split {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidHeader {
            value: s.to_string(),
        }),
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| ConfigError::InvalidHeaderName {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    HeaderValue::from_bytes(value.trim().as_bytes()).map_err(|e| {
        ConfigError::InvalidHeaderValue {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(())
}

/// Replaces a leading `~` with the home directory, when one is known.
fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}
