//! Discord webhook endpoint URLs.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::InvalidWebhookUrl;

/// Hosts that serve the webhook API.
const HOSTS: &[&str] = &[
    "discord.com",
    "discordapp.com",
    "ptb.discord.com",
    "ptb.discordapp.com",
    "canary.discord.com",
    "canary.discordapp.com",
];

const API_BASE: &str = "https://discord.com/api/webhooks";

/// A validated webhook endpoint: `https://discord.com/api/webhooks/{id}/{token}`.
///
/// The token is a credential; [`Display`](fmt::Display) masks it.
///
/// ```
/// use discord_webhooks::webhook::WebhookUrl;
///
/// let url: WebhookUrl = "https://discord.com/api/v10/webhooks/1234/abc-DEF_9".parse().unwrap();
/// assert_eq!(url.id(), 1234);
/// assert_eq!(url.token(), "abc-DEF_9");
/// assert_eq!(url.to_string(), "https://discord.com/api/v10/webhooks/1234/***");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookUrl {
    url: Url,
    id: u64,
    token: String,
}

impl WebhookUrl {
    /// Parses a webhook URL.
    ///
    /// Accepts the `discord.com` and `discordapp.com` hosts with optional
    /// `ptb.`/`canary.` prefixes and an optional `/v{n}` API version segment.
    /// Query and fragment are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWebhookUrl`] if the input is not a webhook URL.
    pub fn parse(input: &str) -> Result<Self, InvalidWebhookUrl> {
        let invalid = |reason| InvalidWebhookUrl {
            url: input.to_string(),
            reason,
        };

        let mut url = Url::parse(input).map_err(|_| invalid("not a valid URL"))?;
        if url.scheme() != "https" {
            return Err(invalid("scheme must be https"));
        }
        if !url.host_str().is_some_and(|host| HOSTS.contains(&host)) {
            return Err(invalid("not a Discord host"));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let rest = match segments.as_slice() {
            ["api", version, rest @ ..] if is_api_version(version) => rest,
            ["api", rest @ ..] => rest,
            _ => return Err(invalid("path must start with /api")),
        };
        let ["webhooks", id, token] = rest else {
            return Err(invalid("expected /webhooks/{id}/{token}"));
        };

        let id = id
            .parse::<u64>()
            .map_err(|_| invalid("webhook id is not a number"))?;
        if !is_valid_token(token) {
            return Err(invalid("malformed webhook token"));
        }
        let token = (*token).to_string();
        let path = format!("/{}", segments.join("/"));

        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self { url, id, token })
    }

    /// Builds the canonical URL for a webhook id and token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWebhookUrl`] if the token is empty or contains
    /// characters Discord never issues.
    pub fn from_parts(id: u64, token: impl Into<String>) -> Result<Self, InvalidWebhookUrl> {
        let token = token.into();
        let raw = format!("{API_BASE}/{id}/{token}");
        if !is_valid_token(&token) {
            return Err(InvalidWebhookUrl {
                url: raw,
                reason: "malformed webhook token",
            });
        }

        let url = Url::parse(&raw).map_err(|_| InvalidWebhookUrl {
            url: raw.clone(),
            reason: "not a valid URL",
        })?;
        Ok(Self { url, id, token })
    }

    /// The webhook id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The webhook token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The full URL, token included.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.url
    }

    /// URL to post messages to; `wait=true` asks the server to return the created message.
    #[must_use]
    pub fn execute_url(&self, wait: bool) -> Url {
        let mut url = self.url.clone();
        if wait {
            url.query_pairs_mut().append_pair("wait", "true");
        }
        url
    }
}

impl fmt::Display for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = self.url.as_str().trim_end_matches(&self.token);
        write!(f, "{masked}***")
    }
}

impl FromStr for WebhookUrl {
    type Err = InvalidWebhookUrl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_api_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_url() {
        let url = WebhookUrl::parse("https://discord.com/api/webhooks/42/token").unwrap();

        assert_eq!(url.id(), 42);
        assert_eq!(url.token(), "token");
        assert_eq!(
            url.as_url().as_str(),
            "https://discord.com/api/webhooks/42/token"
        );
    }

    #[test]
    fn accepts_alternate_hosts_and_trailing_slash() {
        for input in [
            "https://discordapp.com/api/webhooks/1/t",
            "https://ptb.discord.com/api/webhooks/1/t",
            "https://canary.discordapp.com/api/v9/webhooks/1/t/",
        ] {
            assert!(WebhookUrl::parse(input).is_ok(), "{input}");
        }
    }

    #[test]
    fn drops_query_and_fragment() {
        let url = WebhookUrl::parse("https://discord.com/api/webhooks/1/t?wait=false#x").unwrap();
        assert_eq!(url.as_url().as_str(), "https://discord.com/api/webhooks/1/t");
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let url = WebhookUrl::parse("https://discord.com/api/webhooks/1/t/").unwrap();
        assert_eq!(url.to_string(), "https://discord.com/api/webhooks/1/***");
    }

    #[test]
    fn rejects_foreign_host() {
        let err = WebhookUrl::parse("https://example.com/api/webhooks/1/t").unwrap_err();
        assert_eq!(err.reason, "not a Discord host");
    }

    #[test]
    fn rejects_plain_http() {
        let err = WebhookUrl::parse("http://discord.com/api/webhooks/1/t").unwrap_err();
        assert_eq!(err.reason, "scheme must be https");
    }

    #[test]
    fn rejects_wrong_path_shapes() {
        for input in [
            "https://discord.com/webhooks/1/t",
            "https://discord.com/api/webhooks/1",
            "https://discord.com/api/webhooks/1/t/extra",
            "https://discord.com/api/channels/1/t",
        ] {
            assert!(WebhookUrl::parse(input).is_err(), "{input}");
        }
    }

    #[test]
    fn rejects_non_numeric_id() {
        let err = WebhookUrl::parse("https://discord.com/api/webhooks/abc/t").unwrap_err();
        assert_eq!(err.reason, "webhook id is not a number");
    }

    #[test]
    fn from_parts_builds_canonical_url() {
        let url = WebhookUrl::from_parts(7, "secret").unwrap();

        assert_eq!(
            url,
            WebhookUrl::parse("https://discord.com/api/webhooks/7/secret").unwrap()
        );
    }

    #[test]
    fn from_parts_rejects_bad_token() {
        assert!(WebhookUrl::from_parts(7, "").is_err());
        assert!(WebhookUrl::from_parts(7, "a/b").is_err());
    }

    #[test]
    fn execute_url_adds_wait_only_when_requested() {
        let url = WebhookUrl::from_parts(7, "secret").unwrap();

        assert_eq!(url.execute_url(true).query(), Some("wait=true"));
        assert_eq!(url.execute_url(false).query(), None);
    }

    #[test]
    fn display_masks_token() {
        let url = WebhookUrl::from_parts(7, "secret").unwrap();

        let shown = url.to_string();

        assert_eq!(shown, "https://discord.com/api/webhooks/7/***");
        assert!(!shown.contains("secret"));
    }
}
