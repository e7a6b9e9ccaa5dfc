//! The webhook message and its wire encoding.

use serde::Serialize;

use super::embed::check_len;
use super::{AllowedMentions, ValidationError, WebhookEmbed, limits};

/// A file uploaded alongside a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown in the client; also usable as `attachment://name` in embeds
    pub name: String,
    /// Raw file contents
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A message to post through a webhook.
///
/// # Example
///
/// ```
/// use discord_webhooks::message::{WebhookEmbed, WebhookMessage};
///
/// let message = WebhookMessage::text("Build #12 passed")
///     .with_username("CI")
///     .with_embed(WebhookEmbed::new().with_description("all green"));
/// let payload = message.encode().unwrap();
/// assert_eq!(payload.content_type, "application/json");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    /// Plain text content (markdown)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Overrides the webhook's default name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Overrides the webhook's default avatar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Text-to-speech
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    /// Rich embeds
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<WebhookEmbed>,
    /// Mention whitelist; the client default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    /// Uploaded files, sent as multipart parts rather than JSON
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

/// A message body ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Request body bytes
    pub body: Vec<u8>,
    /// Value for the `Content-Type` header
    pub content_type: http::HeaderValue,
}

impl EncodedPayload {
    /// Wraps a pre-serialized JSON body.
    #[must_use]
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            body,
            content_type: http::HeaderValue::from_static("application/json"),
        }
    }
}

impl WebhookMessage {
    /// Creates a message with only text content.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Creates a message with only embeds.
    #[must_use]
    pub fn embeds(embeds: impl IntoIterator<Item = WebhookEmbed>) -> Self {
        Self {
            embeds: embeds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a message with a single file.
    #[must_use]
    pub fn file(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            attachments: vec![Attachment::new(name, data)],
            ..Self::default()
        }
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the avatar.
    #[must_use]
    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Enables or disables text-to-speech.
    #[must_use]
    pub const fn with_tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    /// Appends an embed.
    #[must_use]
    pub fn with_embed(mut self, embed: WebhookEmbed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Appends a file.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sets the mention whitelist.
    #[must_use]
    pub fn with_allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(mentions);
        self
    }

    /// Returns true if there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().is_none_or(str::is_empty)
            && self.embeds.is_empty()
            && self.attachments.is_empty()
    }

    /// Checks the message against Discord's limits.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::Empty);
        }

        check_len("content", self.content.as_deref(), limits::CONTENT)?;
        check_len("username", self.username.as_deref(), limits::USERNAME)?;

        if self.embeds.len() > limits::EMBEDS {
            return Err(ValidationError::TooMany {
                item: "embeds",
                count: self.embeds.len(),
                max: limits::EMBEDS,
            });
        }
        if self.attachments.len() > limits::ATTACHMENTS {
            return Err(ValidationError::TooMany {
                item: "attachments",
                count: self.attachments.len(),
                max: limits::ATTACHMENTS,
            });
        }

        for (index, embed) in self.embeds.iter().enumerate() {
            embed.validate(index)?;
        }

        let total: usize = self.embeds.iter().map(WebhookEmbed::text_len).sum();
        if total > limits::EMBED_TOTAL {
            return Err(ValidationError::TooLong {
                field: "embeds",
                len: total,
                max: limits::EMBED_TOTAL,
            });
        }

        for attachment in &self.attachments {
            if attachment.name.is_empty()
                || attachment
                    .name
                    .chars()
                    .any(|c| matches!(c, '"' | '\\' | '\r' | '\n'))
            {
                return Err(ValidationError::InvalidFileName(attachment.name.clone()));
            }
        }

        Ok(())
    }

    /// Validates and serializes the message.
    ///
    /// Messages without attachments become `application/json`; messages with
    /// attachments become `multipart/form-data` with the JSON in a
    /// `payload_json` part and one `files[i]` part per attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the message breaks a Discord limit.
    pub fn encode(&self) -> Result<EncodedPayload, ValidationError> {
        self.validate()?;
        let json = serde_json::to_vec(self)?;

        if self.attachments.is_empty() {
            return Ok(EncodedPayload::json(json));
        }

        let boundary = multipart_boundary();
        let content_type =
            http::HeaderValue::from_str(&format!("multipart/form-data; boundary={boundary}"))?;
        Ok(EncodedPayload {
            body: multipart_body(&boundary, &json, &self.attachments),
            content_type,
        })
    }
}

impl From<&str> for WebhookMessage {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for WebhookMessage {
    fn from(content: String) -> Self {
        Self::text(content)
    }
}

impl From<WebhookEmbed> for WebhookMessage {
    fn from(embed: WebhookEmbed) -> Self {
        Self::embeds([embed])
    }
}

fn multipart_boundary() -> String {
    let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(24)
        .collect();
    format!("----discord-webhooks-{suffix}")
}

fn multipart_body(boundary: &str, json: &[u8], attachments: &[Attachment]) -> Vec<u8> {
    let capacity = json.len() + attachments.iter().map(|a| a.data.len() + 256).sum::<usize>();
    let mut body = Vec::with_capacity(capacity + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"payload_json\"\r\n");
    body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
    body.extend_from_slice(json);
    body.extend_from_slice(b"\r\n");

    for (index, attachment) in attachments.iter().enumerate() {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files[{index}]\"; filename=\"{}\"\r\n",
                attachment.name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(&attachment.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
