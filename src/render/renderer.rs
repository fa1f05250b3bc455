//! Message renderer.
//!
//! Agent text goes through token resolution, one markdown conversion and
//! placeholder restoration. User text is shown verbatim. System and error
//! notices are plain annotated text. Every payload string is escaped.

use chat_protocol::{FileRef, WidgetRef};
use time::OffsetDateTime;
use tracing::debug;

use crate::core::glyph::glyph;
use crate::core::html::{escape_attr, escape_text};
use crate::core::markdown::{GfmMarkdown, MarkdownConverter};
use crate::tokens::resolve;

use super::message::{avatar_class, OriginKind, RenderedMessage};

/// Wall-clock source for message timestamps.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Local time, falling back to UTC when the local offset is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

pub struct MessageRenderer<C = GfmMarkdown, K = LocalClock> {
    converter: C,
    clock: K,
    debug_render: bool,
}

impl Default for MessageRenderer {
    fn default() -> Self {
        Self::new(GfmMarkdown, LocalClock)
    }
}

impl<C, K> MessageRenderer<C, K>
where
    C: MarkdownConverter,
    K: Clock,
{
    pub fn new(converter: C, clock: K) -> Self {
        Self {
            converter,
            clock,
            debug_render: false,
        }
    }

    /// Logs every rendered fragment at debug level.
    pub fn with_debug_render(mut self, enabled: bool) -> Self {
        self.debug_render = enabled;
        self
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    pub fn render(
        &self,
        origin: OriginKind,
        agent: &str,
        text: &str,
        files: &[FileRef],
        widgets: &[WidgetRef],
    ) -> RenderedMessage {
        let message = match origin {
            OriginKind::Agent => self.agent(agent, text, files, widgets),
            OriginKind::User => self.user(text),
            OriginKind::System => notice(OriginKind::System, "message-text", escape_text(text)),
            OriginKind::Error => notice(
                OriginKind::Error,
                "message-text text-error",
                format!("{} {}", glyph("x"), escape_text(text)),
            ),
        };
        if self.debug_render {
            debug!(origin = origin.as_str(), html = %message.html, "rendered message");
        }
        message
    }

    pub fn render_agent(
        &self,
        agent: &str,
        text: &str,
        files: &[FileRef],
        widgets: &[WidgetRef],
    ) -> RenderedMessage {
        self.render(OriginKind::Agent, agent, text, files, widgets)
    }

    pub fn render_user(&self, text: &str) -> RenderedMessage {
        self.render(OriginKind::User, "", text, &[], &[])
    }

    pub fn render_system(&self, text: &str) -> RenderedMessage {
        self.render(OriginKind::System, "", text, &[], &[])
    }

    pub fn render_error(&self, text: &str) -> RenderedMessage {
        self.render(OriginKind::Error, "", text, &[], &[])
    }

    fn agent(
        &self,
        agent: &str,
        text: &str,
        files: &[FileRef],
        widgets: &[WidgetRef],
    ) -> RenderedMessage {
        let resolved = resolve(text, files, widgets);
        let body_html = resolved.convert(&self.converter);
        self.attributed(OriginKind::Agent, agent, avatar_class(agent), body_html)
    }

    fn user(&self, text: &str) -> RenderedMessage {
        self.attributed(OriginKind::User, "You", "user".to_owned(), escape_text(text))
    }

    fn attributed(
        &self,
        origin: OriginKind,
        author: &str,
        class: String,
        body_html: String,
    ) -> RenderedMessage {
        let now = self.clock.now();
        let timestamp = format!("{:02}:{:02}", now.hour(), now.minute());
        let class_attr = escape_attr(&class);
        let html = format!(
            "<div class=\"message {class_attr}\"><div class=\"agent-avatar {class_attr}\"></div><div class=\"message-content\"><div class=\"message-header\"><span class=\"agent-name\">{}</span><span class=\"timestamp\">{timestamp}</span></div><div class=\"message-text\">{body_html}</div></div></div>",
            escape_text(author)
        );
        RenderedMessage {
            origin,
            author: author.to_owned(),
            avatar_class: Some(class),
            timestamp: Some(timestamp),
            body_html,
            html,
        }
    }
}

fn notice(origin: OriginKind, text_class: &str, body_html: String) -> RenderedMessage {
    let html = format!(
        "<div class=\"message {}\"><div class=\"message-content\"><div class=\"{text_class}\">{body_html}</div></div></div>",
        origin.as_str()
    );
    RenderedMessage {
        origin,
        author: String::new(),
        avatar_class: None,
        timestamp: None,
        body_html,
        html,
    }
}
