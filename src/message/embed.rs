//! Rich embeds attached to a webhook message.

use serde::Serialize;

use super::ValidationError;
use super::limits;

/// A rich embed.
///
/// Built with the `with_*` methods; every text field is checked against
/// Discord's limits when the owning message is encoded.
///
/// # Example
///
/// ```
/// use discord_webhooks::message::{EmbedField, WebhookEmbed};
///
/// let embed = WebhookEmbed::new()
///     .with_title("Deploy finished")
///     .with_color(0x2E_CC71)
///     .with_field(EmbedField::inline("Duration", "42s"));
/// assert_eq!(embed.fields.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebhookEmbed {
    /// Title, rendered bold at the top
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Main body text (markdown)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link opened when the title is clicked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Sidebar color as `0xRRGGBB`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// ISO 8601 timestamp shown in the footer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Footer line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// Large image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    /// Small image in the top right corner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    /// Author line above the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    /// Name/value fields
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

/// Embed footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    /// Footer text
    pub text: String,
    /// Footer icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Embed image or thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    /// Image location (`https://` or `attachment://name`)
    pub url: String,
}

/// Embed author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    /// Author name
    pub name: String,
    /// Link opened when the name is clicked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Author icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// A name/value pair rendered as a small table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    /// Field heading
    pub name: String,
    /// Field body
    pub value: String,
    /// Whether the field may share a row with its neighbours
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

impl EmbedField {
    /// Creates a field on its own row.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }

    /// Creates a field that may share a row.
    #[must_use]
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            inline: true,
            ..Self::new(name, value)
        }
    }
}

impl WebhookEmbed {
    /// Creates an empty embed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the title link.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the sidebar color.
    #[must_use]
    pub const fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color & 0x00FF_FFFF);
        self
    }

    /// Sets the ISO 8601 timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the footer.
    #[must_use]
    pub fn with_footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    /// Sets the large image.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(EmbedImage { url: url.into() });
        self
    }

    /// Sets the thumbnail.
    #[must_use]
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(EmbedImage { url: url.into() });
        self
    }

    /// Sets the author line.
    #[must_use]
    pub fn with_author(mut self, author: EmbedAuthor) -> Self {
        self.author = Some(author);
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, field: EmbedField) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns true if nothing in the embed would be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.footer.is_none()
            && self.image.is_none()
            && self.thumbnail.is_none()
            && self.author.is_none()
            && self.fields.is_empty()
    }

    /// Total characters Discord counts toward the per-message embed budget.
    #[must_use]
    pub fn text_len(&self) -> usize {
        let opt = |s: &Option<String>| s.as_deref().map_or(0, |s| s.chars().count());
        opt(&self.title)
            + opt(&self.description)
            + self.footer.as_ref().map_or(0, |f| f.text.chars().count())
            + self.author.as_ref().map_or(0, |a| a.name.chars().count())
            + self
                .fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
    }

    /// Checks the embed against Discord's per-embed limits.
    pub(crate) fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyEmbed { index });
        }

        check_len("embed title", self.title.as_deref(), limits::EMBED_TITLE)?;
        check_len(
            "embed description",
            self.description.as_deref(),
            limits::EMBED_DESCRIPTION,
        )?;
        check_len(
            "embed footer",
            self.footer.as_ref().map(|f| f.text.as_str()),
            limits::EMBED_FOOTER,
        )?;
        check_len(
            "embed author name",
            self.author.as_ref().map(|a| a.name.as_str()),
            limits::EMBED_AUTHOR,
        )?;

        if self.fields.len() > limits::EMBED_FIELDS {
            return Err(ValidationError::TooMany {
                item: "embed fields",
                count: self.fields.len(),
                max: limits::EMBED_FIELDS,
            });
        }

        for field in &self.fields {
            check_len("field name", Some(field.name.as_str()), limits::FIELD_NAME)?;
            check_len("field value", Some(field.value.as_str()), limits::FIELD_VALUE)?;
        }

        Ok(())
    }
}

/// Fails with [`ValidationError::TooLong`] if `value` has more than `max` characters.
pub(crate) fn check_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.map_or(0, |v| v.chars().count());
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(())
}
