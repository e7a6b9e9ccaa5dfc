//! Mention whitelist for outgoing messages.

use serde::Serialize;

/// Kind of mention Discord may resolve from message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    /// `<@id>` user mentions
    Users,
    /// `<@&id>` role mentions
    Roles,
    /// `@everyone` and `@here`
    Everyone,
}

/// Controls which mentions in a message actually ping.
///
/// Discord rejects a payload that both parses a mention type and lists
/// explicit ids of the same type, so listing ids removes the corresponding
/// parse flag.
///
/// ```
/// use discord_webhooks::message::AllowedMentions;
///
/// let mentions = AllowedMentions::none().with_users(["86699011792191488"]);
/// let json = serde_json::to_string(&mentions).unwrap();
/// assert_eq!(json, r#"{"parse":[],"users":["86699011792191488"]}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowedMentions {
    parse: Vec<MentionType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    users: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    roles: Vec<String>,
}

impl AllowedMentions {
    /// Every mention pings.
    #[must_use]
    pub fn all() -> Self {
        Self {
            parse: vec![MentionType::Users, MentionType::Roles, MentionType::Everyone],
            users: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// Nothing pings.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            parse: Vec::new(),
            users: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// Enables or disables parsing of one mention type.
    #[must_use]
    pub fn with_parse(mut self, kind: MentionType, enabled: bool) -> Self {
        self.parse.retain(|k| *k != kind);
        if enabled {
            match kind {
                MentionType::Users => self.users.clear(),
                MentionType::Roles => self.roles.clear(),
                MentionType::Everyone => {}
            }
            self.parse.push(kind);
        }
        self
    }

    /// Whitelists specific users; disables blanket user parsing.
    #[must_use]
    pub fn with_users<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse.retain(|k| *k != MentionType::Users);
        self.users.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Whitelists specific roles; disables blanket role parsing.
    #[must_use]
    pub fn with_roles<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse.retain(|k| *k != MentionType::Roles);
        self.roles.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Returns the mention types parsed from content.
    #[must_use]
    pub fn parsed(&self) -> &[MentionType] {
        &self.parse
    }
}

impl Default for AllowedMentions {
    fn default() -> Self {
        Self::all()
    }
}
