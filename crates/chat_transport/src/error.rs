use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0} {1}")]
    Status(StatusCode, String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Protocol(#[from] chat_protocol::ProtocolError),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("connection is closed")]
    ChannelClosed,
}

impl TransportError {
    #[must_use]
    pub fn invalid_base_url(value: impl Into<String>) -> Self {
        Self::InvalidBaseUrl(value.into())
    }

    #[must_use]
    pub fn websocket(error: impl std::fmt::Display) -> Self {
        Self::WebSocket(error.to_string())
    }
}

/// FastAPI-style error body: `{"detail": "..."}` or a list of validation
/// entries carrying `msg`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub detail: Option<Value>,
}

impl ErrorPayload {
    fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) => non_empty_string(text).map(str::to_owned),
            Value::Array(entries) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .filter_map(non_empty_string)
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.message() {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

fn non_empty_string(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
