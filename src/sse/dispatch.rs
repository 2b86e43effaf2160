//! Mapping of frames to typed chat events.

use serde_json::Value;

use crate::error::StreamError;
use crate::models::{ChatResponseEnvelope, ThinkingStep};
use crate::sse::events::{ChatStreamEvent, SseFrame, SseParseError};
use crate::sse::payloads::{ContentPayload, ErrorPayload, DEFAULT_ERROR_MESSAGE};

/// Turns `(event name, payload)` frames into [`ChatStreamEvent`]s.
///
/// Remembers the last content snapshot so the `done` envelope can carry the
/// text the consumer actually saw.
#[derive(Debug, Default)]
pub struct Dispatcher {
    last_content: Option<String>,
    correlation_id: Option<String>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher whose envelopes fall back to `correlation_id`.
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            last_content: None,
            correlation_id: Some(correlation_id.into()),
        }
    }

    /// Latest content snapshot delivered.
    pub fn last_content(&self) -> Option<&str> {
        self.last_content.as_deref()
    }

    /// Map one frame. Unrecognized event names yield `Ok(None)`.
    pub fn dispatch(&mut self, frame: SseFrame) -> Result<Option<ChatStreamEvent>, SseParseError> {
        let SseFrame { event, data } = frame;
        let event_type = event.unwrap_or_default();

        let dispatched = match event_type.as_str() {
            "thinking_start" => Some(ChatStreamEvent::ThinkingStart),
            "thinking_step" => Some(ChatStreamEvent::ThinkingStep(parse_step(
                &event_type,
                data,
            )?)),
            "thinking_end" => Some(ChatStreamEvent::ThinkingEnd),
            "content" => self.parse_content(&event_type, data)?,
            "done" => Some(ChatStreamEvent::Done(ChatResponseEnvelope::from_payload(
                &data,
                self.last_content.clone(),
                self.correlation_id.as_deref(),
            ))),
            "error" => Some(ChatStreamEvent::Error(parse_error(data))),
            other => {
                tracing::trace!(event_type = other, "Ignoring unrecognized stream event");
                None
            }
        };

        Ok(dispatched)
    }

    fn parse_content(
        &mut self,
        event_type: &str,
        data: Value,
    ) -> Result<Option<ChatStreamEvent>, SseParseError> {
        let payload: ContentPayload =
            serde_json::from_value(data).map_err(|e| SseParseError::InvalidField {
                event_type: event_type.to_string(),
                field: "content",
                source: e.to_string(),
            })?;

        match payload.content {
            Some(content) if !content.is_empty() => {
                self.last_content = Some(content.clone());
                Ok(Some(ChatStreamEvent::Content(content)))
            }
            _ => Ok(None),
        }
    }
}

fn parse_step(event_type: &str, mut data: Value) -> Result<ThinkingStep, SseParseError> {
    let step = data
        .get_mut("step")
        .filter(|v| !v.is_null())
        .map(Value::take)
        .ok_or_else(|| SseParseError::MissingField {
            event_type: event_type.to_string(),
            field: "step",
        })?;

    serde_json::from_value(step).map_err(|e| SseParseError::InvalidField {
        event_type: event_type.to_string(),
        field: "step",
        source: e.to_string(),
    })
}

/// Backend-reported failure. Always terminal, even when the payload is odd.
fn parse_error(data: Value) -> StreamError {
    let (code, message) = match data {
        Value::String(message) => (None, Some(message)),
        other => match serde_json::from_value::<ErrorPayload>(other) {
            Ok(payload) => (payload.code_string(), payload.message),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed error event payload");
                (None, None)
            }
        },
    };

    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());

    StreamError::BackendError { code, message }
}
