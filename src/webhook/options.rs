//! Tuning knobs for a [`WebhookClient`](super::WebhookClient).

use std::time::Duration;

use super::BackoffPolicy;
use crate::message::AllowedMentions;

/// Default number of counted retries per message.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default number of consecutive 429 re-entries per message.
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 50;

/// Client behavior settings.
///
/// ```
/// use std::time::Duration;
/// use discord_webhooks::webhook::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_max_retries(2)
///     .with_max_queue_depth(100)
///     .with_message_ttl(Duration::from_secs(60));
/// assert_eq!(config.max_retries, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Retries after transport failures or 5xx before a message fails.
    /// Rate-limited attempts are not counted.
    pub max_retries: u32,
    /// Consecutive 429 responses tolerated for one message before it fails.
    /// Kept apart from `max_retries`: a 429 never spends a counted retry.
    pub max_rate_limit_retries: u32,
    /// Queue capacity; `None` is unbounded
    pub max_queue_depth: Option<usize>,
    /// Delay schedule between counted retries
    pub backoff: BackoffPolicy,
    /// Ask the server to return the created message (`?wait=true`)
    pub wait: bool,
    /// Messages queued longer than this fail with `Expired` instead of being sent
    pub message_ttl: Option<Duration>,
    /// Applied to messages that do not set their own allowed mentions
    pub allowed_mentions: Option<AllowedMentions>,
}

impl ClientConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets how many consecutive 429 responses a message may absorb.
    #[must_use]
    pub const fn with_max_rate_limit_retries(mut self, max: u32) -> Self {
        self.max_rate_limit_retries = max;
        self
    }

    /// Bounds the queue.
    #[must_use]
    pub const fn with_max_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = Some(depth);
        self
    }

    /// Sets the backoff policy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets whether to wait for the created message.
    #[must_use]
    pub const fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Sets the message time-to-live.
    #[must_use]
    pub const fn with_message_ttl(mut self, ttl: Duration) -> Self {
        self.message_ttl = Some(ttl);
        self
    }

    /// Sets the default allowed mentions.
    #[must_use]
    pub fn with_allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(mentions);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            max_queue_depth: None,
            backoff: BackoffPolicy::default(),
            wait: true,
            message_ttl: None,
            allowed_mentions: None,
        }
    }
}
