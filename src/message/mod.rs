//! Payload encoder for Discord webhook messages.
//!
//! This module provides:
//! - The message model ([`WebhookMessage`], [`WebhookEmbed`], [`Attachment`])
//! - Mention control ([`AllowedMentions`])
//! - Local validation against Discord's limits ([`ValidationError`])
//! - Wire encoding to JSON or `multipart/form-data` ([`EncodedPayload`])
//!
//! Encoding is pure and synchronous; the client runs it inside `send` so a
//! malformed message is rejected before it ever reaches the queue.

mod embed;
mod error;
mod mentions;
mod payload;


pub use embed::{EmbedAuthor, EmbedField, EmbedFooter, EmbedImage, WebhookEmbed};
pub use error::ValidationError;
pub use mentions::{AllowedMentions, MentionType};
pub use payload::{Attachment, EncodedPayload, WebhookMessage};

/// Discord's message limits, in characters or item counts.
pub mod limits {
    /// Message content.
    pub const CONTENT: usize = 2000;
    /// Username override.
    pub const USERNAME: usize = 80;
    /// Embeds per message.
    pub const EMBEDS: usize = 10;
    /// Files per message.
    pub const ATTACHMENTS: usize = 10;
    /// Embed title.
    pub const EMBED_TITLE: usize = 256;
    /// Embed description.
    pub const EMBED_DESCRIPTION: usize = 4096;
    /// Embed footer text.
    pub const EMBED_FOOTER: usize = 2048;
    /// Embed author name.
    pub const EMBED_AUTHOR: usize = 256;
    /// Fields per embed.
    pub const EMBED_FIELDS: usize = 25;
    /// Field name.
    pub const FIELD_NAME: usize = 256;
    /// Field value.
    pub const FIELD_VALUE: usize = 1024;
    /// Combined text of all embeds in one message.
    pub const EMBED_TOTAL: usize = 6000;
}
