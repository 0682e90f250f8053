//! Shared chat and streaming types.

use std::fmt;

use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Returns the wire identifier used in chat completion payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat message owned by a session.
///
/// `content` and `thinking` are append-only while `is_streaming` is true
/// and immutable once the terminating stream event clears the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Opaque identifier, unique within a session.
    pub id: String,
    pub role: Role,
    /// Accumulated visible text.
    pub content: String,
    /// Accumulated reasoning text, collapsed by default in frontends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Creation time, immutable.
    pub timestamp: DateTime<Utc>,
    /// True from creation until the stream completes or fails.
    pub is_streaming: bool,
}

impl ChatMessage {
    /// Creates a completed message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            thinking: None,
            timestamp: Utc::now(),
            is_streaming: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates an empty assistant placeholder that is still streaming.
    pub fn streaming_placeholder() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: String::new(),
            thinking: None,
            timestamp: Utc::now(),
            is_streaming: true,
        }
    }
}

/// Wire-facing (role, content) pair sent as request history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for ChatTurn {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Events emitted while streaming an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental visible text.
    ContentDelta(String),
    /// Incremental reasoning text.
    ThinkingDelta(String),
    /// Stream ended; the message is final.
    Completed,
}

/// Categories of assistant errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistErrorKind {
    /// Settings incomplete or invalid; no request was attempted.
    Configuration,
    /// Non-success HTTP status or request-level network failure.
    HttpStatus,
    /// Transport exposes no readable streaming body.
    StreamUnavailable,
    /// Failed to parse a response frame.
    Parse,
}

impl fmt::Display for AssistErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistErrorKind::Configuration => write!(f, "configuration"),
            AssistErrorKind::HttpStatus => write!(f, "http_status"),
            AssistErrorKind::StreamUnavailable => write!(f, "stream_unavailable"),
            AssistErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistError {
    /// Error category
    pub kind: AssistErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl AssistError {
    pub fn new(kind: AssistErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AssistErrorKind::Configuration, message)
    }

    /// Creates an HTTP status error, extracting `error.message` from JSON
    /// bodies when present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(error_obj) = json.get("error")
                && let Some(msg) = error_obj.get("message").and_then(|v| v.as_str())
            {
                return Self {
                    kind: AssistErrorKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: AssistErrorKind::HttpStatus,
            message,
            details,
        }
    }

    /// Creates a stream-unavailable error.
    pub fn stream_unavailable(message: impl Into<String>) -> Self {
        Self::new(AssistErrorKind::StreamUnavailable, message)
    }

    /// Creates a frame parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(AssistErrorKind::Parse, message)
    }
}

impl fmt::Display for AssistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AssistError {}

/// Result type for assistant operations.
pub type AssistResult<T> = std::result::Result<T, AssistError>;

/// Boxed stream of assistant events.
pub type AssistStream = BoxStream<'static, AssistResult<StreamEvent>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_extracts_error_message() {
        let body = r#"{"error":{"message":"model not found","type":"invalid_request_error"}}"#;
        let err = AssistError::http_status(404, body);
        assert_eq!(err.kind, AssistErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 404: model not found");
        assert_eq!(err.details.as_deref(), Some(body));
    }

    #[test]
    fn test_http_status_plain_body() {
        let err = AssistError::http_status(500, "upstream exploded");
        assert_eq!(err.message, "HTTP 500");
        assert_eq!(err.details.as_deref(), Some("upstream exploded"));
    }

    #[test]
    fn test_role_wire_identifiers() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_chat_turn_from_message() {
        let msg = ChatMessage::assistant("hi there");
        let turn = ChatTurn::from(&msg);
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "hi there");
    }

    #[test]
    fn test_streaming_placeholder_starts_empty() {
        let msg = ChatMessage::streaming_placeholder();
        assert!(msg.is_streaming);
        assert!(msg.content.is_empty());
        assert!(msg.thinking.is_none());
        assert_eq!(msg.role, Role::Assistant);
    }
}
