//! Validation errors raised before a message reaches the queue.

use thiserror::Error;

/// Error type for local message validation.
///
/// Every variant mirrors a limit the Discord API enforces server-side;
/// catching them locally saves a round trip that would end in a 400.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The message has no content, no embeds and no attachments.
    #[error("Message must have content, an embed, or an attachment")]
    Empty,

    /// A text field is longer than Discord allows.
    #[error("{field} is {len} characters long (max {max})")]
    TooLong {
        /// Which field overflowed
        field: &'static str,
        /// Its length in characters
        len: usize,
        /// The allowed maximum
        max: usize,
    },

    /// A collection holds more items than Discord allows.
    #[error("Too many {item}: {count} (max {max})")]
    TooMany {
        /// What was counted
        item: &'static str,
        /// How many were supplied
        count: usize,
        /// The allowed maximum
        max: usize,
    },

    /// An embed has no visible content.
    #[error("Embed at index {index} is empty")]
    EmptyEmbed {
        /// Position of the embed in the message
        index: usize,
    },

    /// An attachment name cannot be placed in a multipart header.
    #[error("Invalid attachment name '{0}'")]
    InvalidFileName(String),

    /// The payload could not be serialized.
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The computed content type is not a valid header value.
    #[error("Invalid content type: {0}")]
    ContentType(#[from] http::header::InvalidHeaderValue),
}
