//! Wire contract between the chat client and the agent backend.
//!
//! This crate only defines the JSON shapes exchanged over the session channel
//! and the inline token literals agents embed in their text. It carries no
//! transport, rendering, or session behavior.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error returned when an inbound frame cannot be decoded at all.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("inbound frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inbound frame must be a JSON object")]
    NotAnObject,

    #[error("inbound frame has no string `type` field")]
    MissingEventType,
}

/// Structured side-channel entry describing one generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_path: String,
}

/// Link attached to a widget; `kind` is the visual style (`primary`, `secondary`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetAction {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Resolved widget content as produced by the backend widget manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetPayload {
    #[serde(default)]
    pub widget_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub actions: Vec<WidgetAction>,
}

/// Structured side-channel entry describing one widget reference.
///
/// `pattern` is the exact token literal the agent wrote, e.g.
/// `[WIDGET:roaming_plans:["ROAM-USA-7"]]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetRef {
    #[serde(default)]
    pub widget_type: String,
    #[serde(default)]
    pub widget_ids: Vec<String>,
    #[serde(default)]
    pub widget_data: WidgetPayload,
    #[serde(default)]
    pub pattern: String,
}

/// Event pushed by the backend over the session channel.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    System {
        content: String,
    },
    /// Echo of a message the user sent.
    UserMessage {
        content: String,
    },
    AgentMessage {
        agent: String,
        content: String,
        files: Vec<FileRef>,
        widgets: Vec<WidgetRef>,
    },
    ToolStart {
        agent: String,
        tool: String,
    },
    ToolComplete {
        agent: String,
        tool: String,
    },
    AgentWorking {
        agent: String,
        content: String,
    },
    Error {
        content: String,
    },
    /// Unrecognized `type`, retained so callers can log it.
    Unknown {
        event_type: String,
        payload: Value,
    },
}

impl InboundEvent {
    /// Decodes one text frame.
    ///
    /// Missing optional fields decode as empty strings or empty lists, and
    /// malformed `files`/`widgets` entries are skipped individually so one bad
    /// side-channel entry never drops the whole message.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        if !value.is_object() {
            return Err(ProtocolError::NotAnObject);
        }
        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingEventType)?
            .to_owned();

        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };

        Ok(match event_type.as_str() {
            "system" => Self::System {
                content: text("content"),
            },
            "user_message" => Self::UserMessage {
                content: text("content"),
            },
            "agent_message" => Self::AgentMessage {
                agent: text("agent"),
                content: text("content"),
                files: lenient_list(value.get("files")),
                widgets: lenient_list(value.get("widgets")),
            },
            "tool_start" => Self::ToolStart {
                agent: text("agent"),
                tool: text("tool"),
            },
            "tool_complete" => Self::ToolComplete {
                agent: text("agent"),
                tool: text("tool"),
            },
            "agent_working" => Self::AgentWorking {
                agent: text("agent"),
                content: text("content"),
            },
            "error" => Self::Error {
                content: text("content"),
            },
            _ => Self::Unknown {
                event_type,
                payload: value,
            },
        })
    }

    /// Wire `type` value for this event.
    pub fn event_type(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::UserMessage { .. } => "user_message",
            Self::AgentMessage { .. } => "agent_message",
            Self::ToolStart { .. } => "tool_start",
            Self::ToolComplete { .. } => "tool_complete",
            Self::AgentWorking { .. } => "agent_working",
            Self::Error { .. } => "error",
            Self::Unknown { event_type, .. } => event_type,
        }
    }
}

fn lenient_list<T>(value: Option<&Value>) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Message sent from the client to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    ChatMessage { content: String },
}

impl OutboundMessage {
    pub fn chat(content: impl Into<String>) -> Self {
        Self::ChatMessage {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::ChatMessage { content } => content,
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Formats an inline file token: `[FILE:<id>:<description>]`.
pub fn file_token(file_id: &str, description: &str) -> String {
    format!("[FILE:{file_id}:{description}]")
}

/// Formats an inline widget token the way the backend does:
/// `[WIDGET:<type>:["id1", "id2"]]`.
pub fn widget_token(widget_type: &str, widget_ids: &[&str]) -> String {
    let ids = widget_ids
        .iter()
        .map(|id| Value::String((*id).to_owned()).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[WIDGET:{widget_type}:[{ids}]]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn agent_message_decodes_side_channels() {
        let frame = r#"{
            "type": "agent_message",
            "agent": "BillingAgent",
            "content": "See [FILE:bill.csv:Bill]",
            "files": [{"file_id": "bill.csv", "description": "Bill", "file_type": "csv", "file_path": "/tmp/bill.csv"}],
            "widgets": [{"widget_type": "addons", "widget_ids": [], "widget_data": {"widget_type": "addons", "title": "Add-ons", "data": []}, "pattern": "[WIDGET:addons:[]]"}]
        }"#;

        let event = InboundEvent::parse(frame).expect("frame decodes");
        let InboundEvent::AgentMessage {
            agent,
            files,
            widgets,
            ..
        } = event
        else {
            panic!("expected agent message");
        };
        assert_eq!(agent, "BillingAgent");
        assert_eq!(files[0].file_type, "csv");
        assert_eq!(widgets[0].widget_data.title, "Add-ons");
        assert!(widgets[0].widget_data.actions.is_empty());
    }

    #[test]
    fn malformed_side_channel_entries_are_skipped() {
        let frame = r#"{"type":"agent_message","agent":"Alex","content":"hi","files":[42,{"file_id":"a.png"}],"widgets":null}"#;
        let event = InboundEvent::parse(frame).expect("frame decodes");
        assert_matches!(
            event,
            InboundEvent::AgentMessage { ref files, ref widgets, .. }
                if files.len() == 1 && files[0].file_id == "a.png" && widgets.is_empty()
        );
    }

    #[test]
    fn unknown_type_is_preserved() {
        let event = InboundEvent::parse(r#"{"type":"heartbeat","n":1}"#).expect("frame decodes");
        assert_eq!(event.event_type(), "heartbeat");
        assert_matches!(event, InboundEvent::Unknown { .. });
    }

    #[test]
    fn frames_without_type_are_rejected() {
        assert_matches!(
            InboundEvent::parse(r#"{"content":"x"}"#),
            Err(ProtocolError::MissingEventType)
        );
        assert_matches!(InboundEvent::parse("[]"), Err(ProtocolError::NotAnObject));
        assert_matches!(InboundEvent::parse("{"), Err(ProtocolError::Json(_)));
    }

    #[test]
    fn outbound_chat_message_shape() {
        let json = OutboundMessage::chat("hello").to_json().expect("serializes");
        assert_eq!(json, r#"{"type":"chat_message","content":"hello"}"#);
    }

    #[test]
    fn token_helpers_match_backend_format() {
        assert_eq!(file_token("report.csv", "Report"), "[FILE:report.csv:Report]");
        assert_eq!(
            widget_token("roaming_plans", &["ROAM-USA-7", "ROAM-USA-30"]),
            r#"[WIDGET:roaming_plans:["ROAM-USA-7", "ROAM-USA-30"]]"#
        );
        assert_eq!(widget_token("current_plan", &[]), "[WIDGET:current_plan:[]]");
    }
}
