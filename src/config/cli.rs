//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// discord-webhooks: post messages to a Discord webhook
///
/// Every `--content` becomes one message; messages are delivered in order
/// within the webhook's rate limit.
#[derive(Debug, Parser)]
#[command(name = "discord-webhooks")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Webhook URL (required for sending)
    #[arg(long)]
    pub url: Option<String>,

    /// Message text; repeat to send several messages in order
    #[arg(long = "content", short = 'm', value_name = "TEXT")]
    pub contents: Vec<String>,

    /// Display name override
    #[arg(long)]
    pub username: Option<String>,

    /// Avatar URL override
    #[arg(long = "avatar-url")]
    pub avatar_url: Option<String>,

    /// Send messages as text-to-speech
    #[arg(long)]
    pub tts: bool,

    /// File to upload; attached to the last message (can be specified multiple times)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Maximum number of retries after transient failures
    #[arg(long = "retry-max")]
    pub retry_max: Option<u32>,

    /// Maximum number of queued messages
    #[arg(long = "queue-depth")]
    pub queue_depth: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Do not wait for the created message (no message ids reported)
    #[arg(long = "no-wait")]
    pub no_wait: bool,

    /// Suppress all mentions (@everyone, users, roles)
    #[arg(long = "no-mentions")]
    pub no_mentions: bool,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for discord-webhooks
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "discord-webhooks.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
