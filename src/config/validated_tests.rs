//! Tests for validated configuration.

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::ValidatedConfig;

const URL: &str = "https://discord.com/api/webhooks/1/token";

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["discord-webhooks"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// CLI args with a URL and one message, plus `extra`
fn sending(extra: &[&str]) -> Cli {
    let mut args = vec!["--url", URL, "--content", "hello"];
    args.extend(extra);
    cli(&args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}
