//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Webhook configuration section
    #[serde(default)]
    pub webhook: WebhookSection,

    /// Client behavior section
    #[serde(default)]
    pub client: ClientSection,

    /// Retry backoff section
    #[serde(default)]
    pub backoff: BackoffSection,
}

/// Webhook configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Webhook URL
    pub url: Option<String>,

    /// Display name override
    pub username: Option<String>,

    /// Avatar URL override
    pub avatar_url: Option<String>,

    /// Wait for the created message (default: true)
    pub wait: Option<bool>,

    /// Suppress all mentions
    #[serde(default)]
    pub suppress_mentions: bool,
}

/// Client behavior section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Maximum number of retries after transient failures
    pub max_retries: Option<u32>,

    /// Consecutive 429 responses tolerated per message
    pub max_rate_limit_retries: Option<u32>,

    /// Maximum number of queued messages (unbounded if unset)
    pub max_queue_depth: Option<usize>,

    /// Seconds a message may wait in the queue before it expires
    pub message_ttl: Option<u64>,

    /// HTTP request timeout in seconds
    pub timeout: Option<u64>,
}

/// Retry backoff section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffSection {
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: Option<u64>,

    /// Upper bound for any retry delay, in milliseconds
    pub max_delay_ms: Option<u64>,

    /// Growth factor between retries
    pub multiplier: Option<f64>,

    /// Random spread as a fraction of the delay (0.0 to 1.0)
    pub jitter: Option<f64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# discord-webhooks configuration file

[webhook]
# Webhook URL (required)
# url = "https://discord.com/api/webhooks/{id}/{token}"

# Display name and avatar overrides
# username = "Deploy Bot"
# avatar_url = "https://example.com/avatar.png"

# Wait for the created message so its id can be reported (default: true)
# wait = true

# Suppress @everyone, user, and role mentions
# suppress_mentions = false

[client]
# Retries after transport failures or 5xx responses (default: 5)
# Rate-limited (429) attempts are not counted.
# max_retries = 5

# Consecutive 429 responses a message may absorb before it fails (default: 50)
# max_rate_limit_retries = 50

# Maximum number of queued messages (default: unbounded)
# max_queue_depth = 100

# Seconds a message may wait in the queue before it expires (default: never)
# message_ttl = 300

# HTTP request timeout in seconds (default: 30)
timeout = 30

[backoff]
# Delay before the first retry in milliseconds (default: 500)
# initial_delay_ms = 500

# Maximum retry delay in milliseconds (default: 30000)
# max_delay_ms = 30000

# Backoff multiplier (default: 2.0)
# multiplier = 2.0

# Random spread as a fraction of the delay (default: 0.1)
# jitter = 0.1
"#
    .to_string()
}
