//! Rendered transcript entries.

/// Who a transcript entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginKind {
    User,
    Agent,
    System,
    Error,
}

impl OriginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
            Self::Error => "error",
        }
    }
}

/// One entry appended to the transcript. Entries are never edited after
/// they are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub origin: OriginKind,
    /// Display name; `You` for user entries, empty for system and error notices.
    pub author: String,
    /// Visual category derived from the author, e.g. `billingagent`.
    pub avatar_class: Option<String>,
    /// Local `HH:MM` at render time.
    pub timestamp: Option<String>,
    /// Inner message body.
    pub body_html: String,
    /// Complete message fragment.
    pub html: String,
}

impl RenderedMessage {
    /// Agent whose full message this is. The session reacts to it by clearing
    /// that agent's tool indicators.
    pub fn completes_agent(&self) -> Option<&str> {
        match self.origin {
            OriginKind::Agent => Some(&self.author),
            _ => None,
        }
    }
}

/// Lowercase class name for an author; characters outside `[a-z0-9_-]`
/// become `-` so the result is a single class token.
pub fn avatar_class(author: &str) -> String {
    let class: String = author
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if class.is_empty() {
        "agent".to_owned()
    } else {
        class
    }
}
