//! Configuration layer for resilient-http.
//!
//! This module provides:
//! - In-process client configuration ([`ClientConfig`])
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`], [`Action`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Headers are merged rather than replaced: TOML `[headers]` come first,
//! then every `--header`, then `--bearer`. A later header with the same
//! name, compared case-insensitively, replaces an earlier one.
//!
//! `[decoders]` entries are appended to the built-in mapping in key order.
//!
//! # TOML-Only Options
//!
//! - `client.name` - selects a named transport when the library is
//!   embedded with a [`ClientRegistry`](crate::transport::ClientRegistry)
//! - `client.transient_status_codes` - replaces the retried status set

mod cli;
mod client;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use client::ClientConfig;
pub use error::ConfigError;
pub use toml::{ClientSection, TomlConfig, default_config_template};
pub use validated::{Action, ValidatedConfig, write_default_config};
