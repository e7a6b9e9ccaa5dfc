//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::message::AllowedMentions;
use crate::webhook::{BackoffPolicy, ClientConfig, WebhookUrl};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Webhook to post to (required)
    pub url: WebhookUrl,

    /// Message texts, one message each, in send order
    pub contents: Vec<String>,

    /// Files to upload with the last message
    pub files: Vec<PathBuf>,

    /// Display name override
    pub username: Option<String>,

    /// Avatar URL override
    pub avatar_url: Option<String>,

    /// Text-to-speech
    pub tts: bool,

    /// Client behavior (retries, queue, backoff, wait, mentions)
    pub client: ClientConfig,

    /// HTTP request timeout
    pub timeout: Duration,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue_depth = self
            .client
            .max_queue_depth
            .map_or_else(|| "unbounded".to_string(), |d| d.to_string());

        write!(
            f,
            "Config {{ url: {}, messages: {}, files: {}, max_retries: {}, queue_depth: {}, \
             wait: {}, timeout: {}s, backoff: {}ms..{}ms x{} }}",
            self.url,
            self.contents.len(),
            self.files.len(),
            self.client.max_retries,
            queue_depth,
            self.client.wait,
            self.timeout.as_secs(),
            self.client.backoff.initial_delay.as_millis(),
            self.client.backoff.max_delay.as_millis(),
            self.client.backoff.multiplier,
        )
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
    /// - The webhook URL is missing or not a Discord webhook URL
    /// - There is nothing to send (no content and no files)
    /// - A duration or the queue depth is zero
    /// - The backoff settings are inconsistent
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let url = Self::resolve_url(cli, toml)?;

        if cli.contents.is_empty() && cli.files.is_empty() {
            return Err(ConfigError::missing(
                field::CONTENT,
                "Use --content or --file to choose what to send",
            ));
        }

        let timeout = Self::resolve_timeout(cli, toml)?;
        let client = Self::build_client_config(cli, toml)?;

        let webhook = toml.map(|t| &t.webhook);
        let username = cli
            .username
            .clone()
            .or_else(|| webhook.and_then(|w| w.username.clone()));
        let avatar_url = cli
            .avatar_url
            .clone()
            .or_else(|| webhook.and_then(|w| w.avatar_url.clone()));

        Ok(Self {
            url,
            contents: cli.contents.clone(),
            files: cli.files.clone(),
            username,
            avatar_url,
            tts: cli.tts,
            client,
            timeout,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<WebhookUrl, ConfigError> {
        // CLI takes precedence
        let url_str = cli
            .url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.webhook.url.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(field::URL, "Use --url or set webhook.url in config file")
            })?;

        Ok(WebhookUrl::parse(url_str)?)
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.client.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn build_client_config(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<ClientConfig, ConfigError> {
        let client = toml.map(|t| &t.client);

        let max_retries = cli
            .retry_max
            .or_else(|| client.and_then(|c| c.max_retries))
            .unwrap_or(defaults::MAX_RETRIES);

        let mut config = ClientConfig::new()
            .with_max_retries(max_retries)
            .with_backoff(Self::build_backoff(toml)?);

        if let Some(max) = client.and_then(|c| c.max_rate_limit_retries) {
            config = config.with_max_rate_limit_retries(max);
        }

        if let Some(depth) = cli
            .queue_depth
            .or_else(|| client.and_then(|c| c.max_queue_depth))
        {
            if depth == 0 {
                return Err(ConfigError::InvalidQueue(
                    "max_queue_depth must be greater than 0".to_string(),
                ));
            }
            config = config.with_max_queue_depth(depth);
        }

        if let Some(seconds) = client.and_then(|c| c.message_ttl) {
            if seconds == 0 {
                return Err(ConfigError::InvalidDuration {
                    field: "message_ttl",
                    reason: "must be greater than 0".to_string(),
                });
            }
            config = config.with_message_ttl(Duration::from_secs(seconds));
        }

        // --no-wait only disables; the file may disable as well
        let wait = !cli.no_wait && toml.and_then(|t| t.webhook.wait).unwrap_or(true);
        config = config.with_wait(wait);

        // Boolean flags use OR semantics
        if cli.no_mentions || toml.is_some_and(|t| t.webhook.suppress_mentions) {
            config = config.with_allowed_mentions(AllowedMentions::none());
        }

        Ok(config)
    }

    fn build_backoff(toml: Option<&TomlConfig>) -> Result<BackoffPolicy, ConfigError> {
        let backoff = toml.map(|t| &t.backoff);

        // Backoff tuning is TOML-only
        let initial_delay_ms = backoff
            .and_then(|b| b.initial_delay_ms)
            .unwrap_or(defaults::BACKOFF_INITIAL_DELAY_MS);

        let max_delay_ms = backoff
            .and_then(|b| b.max_delay_ms)
            .unwrap_or(defaults::BACKOFF_MAX_DELAY_MS);

        let multiplier = backoff
            .and_then(|b| b.multiplier)
            .unwrap_or(defaults::BACKOFF_MULTIPLIER);

        let jitter = backoff
            .and_then(|b| b.jitter)
            .unwrap_or(defaults::BACKOFF_JITTER);

        if initial_delay_ms == 0 {
            return Err(ConfigError::InvalidBackoff(
                "initial_delay_ms must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidBackoff(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&jitter) {
            return Err(ConfigError::InvalidBackoff(
                "jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        if max_delay_ms < initial_delay_ms {
            return Err(ConfigError::InvalidBackoff(format!(
                "max_delay_ms ({max_delay_ms}) must be >= initial_delay_ms ({initial_delay_ms})"
            )));
        }

        Ok(BackoffPolicy::new()
            .with_initial_delay(Duration::from_millis(initial_delay_ms))
            .with_max_delay(Duration::from_millis(max_delay_ms))
            .with_multiplier(multiplier)
            .with_jitter(jitter))
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
