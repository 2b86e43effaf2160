//! Line classification and frame assembly.
//!
//! [`FrameAssembler`] turns complete lines into `(event name, JSON payload)`
//! frames. A payload is emitted as soon as the buffered `data:` text parses,
//! so frames need not be blank-line terminated. JSON that is merely
//! incomplete keeps buffering across `data:` lines; JSON that can never
//! parse is reported and dropped.

use serde_json::Value;

use crate::sse::events::{SseFrame, SseLine, SseParseError};

/// Inert end-of-stream sentinel some backends send as a data line.
const DONE_SENTINEL: &str = "[DONE]";

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.strip_prefix(' ').unwrap_or(rest).to_string());
    }

    SseLine::Other(line.to_string())
}

/// Stateful assembler that accumulates lines and emits complete frames.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    /// Event name announced for the frame being built
    current_event: Option<String>,
    /// `data:` text not yet parsed, lines joined with `\n`
    pending_data: Option<String>,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one complete line.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - a payload parsed and is ready for dispatch
    /// - `Ok(None)` - the line was consumed, nothing to emit yet
    /// - `Err(error)` - a payload was dropped; the assembler is ready for more
    pub fn feed_line(&mut self, line: &str) -> Result<Option<SseFrame>, SseParseError> {
        match parse_sse_line(line) {
            SseLine::Event(name) => {
                let stale = self.drop_pending();
                self.current_event = Some(name);
                stale.map_or(Ok(None), Err)
            }
            SseLine::Data(data) => self.push_data(&data),
            SseLine::Empty => {
                let stale = self.drop_pending();
                self.current_event = None;
                stale.map_or(Ok(None), Err)
            }
            SseLine::Comment(_) | SseLine::Other(_) => Ok(None),
        }
    }

    /// Name announced for the frame currently being built.
    pub fn current_event(&self) -> Option<&str> {
        self.current_event.as_deref()
    }

    /// True while `data:` text is waiting for its continuation.
    pub fn has_pending_data(&self) -> bool {
        self.pending_data.is_some()
    }

    /// Flush at end of stream; still-incomplete data is reported.
    pub fn finish(&mut self) -> Option<SseParseError> {
        let stale = self.drop_pending();
        self.current_event = None;
        stale
    }

    fn push_data(&mut self, data: &str) -> Result<Option<SseFrame>, SseParseError> {
        if self.pending_data.is_none() {
            let trimmed = data.trim();
            if trimmed == DONE_SENTINEL || trimmed.is_empty() {
                return Ok(None);
            }
        }

        let buffered = match self.pending_data.take() {
            Some(mut pending) => {
                pending.push('\n');
                pending.push_str(data);
                pending
            }
            None => data.to_string(),
        };

        match serde_json::from_str::<Value>(&buffered) {
            Ok(value) => Ok(Some(SseFrame {
                event: self.current_event.take(),
                data: value,
            })),
            Err(e) if e.is_eof() => {
                self.pending_data = Some(buffered);
                Ok(None)
            }
            Err(e) => Err(SseParseError::InvalidJson {
                event_type: self.event_label(),
                source: e.to_string(),
            }),
        }
    }

    fn drop_pending(&mut self) -> Option<SseParseError> {
        self.pending_data
            .take()
            .map(|_| SseParseError::IncompletePayload {
                event_type: self.event_label(),
            })
    }

    fn event_label(&self) -> String {
        self.current_event.clone().unwrap_or_default()
    }
}
