//! Tests for validated configuration.

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{Action, ValidatedConfig};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["resilient-http"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

/// Helper for the common `get <url>` invocation with extra global options
fn get(options: &[&str]) -> Cli {
    let mut args = options.to_vec();
    args.extend(["get", "https://example.com/items"]);
    cli(&args)
}
