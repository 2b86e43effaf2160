//! SSE line, frame and event types.

use serde_json::Value;

use crate::error::StreamError;
use crate::models::{ChatResponseEnvelope, ThinkingStep};

/// Typed event delivered to the consumer of a chat stream.
///
/// `Done` and `Error` are terminal: nothing follows either of them.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    /// The backend started reasoning.
    ThinkingStart,
    /// A reasoning step was created or updated (upsert by id).
    ThinkingStep(ThinkingStep),
    /// The backend finished reasoning. Steps stay visible.
    ThinkingEnd,
    /// Full assistant text so far. Replaces any earlier snapshot.
    Content(String),
    /// Final answer. Ends the stream.
    Done(ChatResponseEnvelope),
    /// Terminal failure. Ends the stream.
    Error(StreamError),
}

impl ChatStreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatStreamEvent::Done(_) | ChatStreamEvent::Error(_))
    }

    /// Wire name of the event that produced this value.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            ChatStreamEvent::ThinkingStart => "thinking_start",
            ChatStreamEvent::ThinkingStep(_) => "thinking_step",
            ChatStreamEvent::ThinkingEnd => "thinking_end",
            ChatStreamEvent::Content(_) => "content",
            ChatStreamEvent::Done(_) => "done",
            ChatStreamEvent::Error(_) => "error",
        }
    }
}

/// Parsed SSE line types
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration: "event: <type>"
    Event(String),
    /// Data payload: "data: <payload>"
    Data(String),
    /// Empty line (frame boundary)
    Empty,
    /// Comment line: ": <comment>"
    Comment(String),
    /// Any other field (`id:`, `retry:`, garbage)
    Other(String),
}

/// An event name paired with a parsed JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: Value,
}

impl SseFrame {
    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or("")
    }
}

/// Non-fatal problems with a single payload. The stream continues.
#[derive(Debug, Clone, PartialEq)]
pub enum SseParseError {
    /// `data:` content that can never become valid JSON
    InvalidJson { event_type: String, source: String },
    /// Buffered JSON was still incomplete at a frame boundary
    IncompletePayload { event_type: String },
    /// Payload lacks a field the event requires
    MissingField {
        event_type: String,
        field: &'static str,
    },
    /// A required field has the wrong shape
    InvalidField {
        event_type: String,
        field: &'static str,
        source: String,
    },
}

impl SseParseError {
    pub fn event_type(&self) -> &str {
        match self {
            SseParseError::InvalidJson { event_type, .. }
            | SseParseError::IncompletePayload { event_type }
            | SseParseError::MissingField { event_type, .. }
            | SseParseError::InvalidField { event_type, .. } => event_type,
        }
    }
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SseParseError::InvalidJson { event_type, source } => {
                write!(f, "Invalid JSON for event '{}': {}", event_type, source)
            }
            SseParseError::IncompletePayload { event_type } => {
                write!(f, "Incomplete JSON dropped for event '{}'", event_type)
            }
            SseParseError::MissingField { event_type, field } => {
                write!(f, "Event '{}' is missing field '{}'", event_type, field)
            }
            SseParseError::InvalidField {
                event_type,
                field,
                source,
            } => write!(
                f,
                "Event '{}' has invalid field '{}': {}",
                event_type, field, source
            ),
        }
    }
}

impl std::error::Error for SseParseError {}
