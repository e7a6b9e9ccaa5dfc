//! Configuration layer for discord-webhooks.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
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
//! The webhook URL has no default: it must come from `--url` or `webhook.url`.
//! What to send (`--content`, `--file`) is CLI-only.
//!
//! # Boolean Flag Semantics
//!
//! `--no-wait` and `--no-mentions` only ever disable waiting or mentions:
//! if either the CLI or the TOML file turns a feature off, it is off.
//!
//! # TOML-Only Options
//!
//! - `client.message_ttl` - Queue time after which a message expires
//! - `backoff.*` - Retry delay tuning (initial, max, multiplier, jitter)

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
