//! Synchronous chat-stream ingestion.
//!
//! [`StreamSession`] chains the decoder, line buffer, frame assembler and
//! dispatcher. It knows nothing about transports or runtimes: the async
//! driver in [`crate::api::chat`] feeds it body chunks, and tests and
//! benchmarks can feed it bytes directly.

use crate::error::StreamError;
use crate::sse::buffer::{LineBuffer, DEFAULT_MAX_LINE_BYTES};
use crate::sse::decoder::Utf8Decoder;
use crate::sse::dispatch::Dispatcher;
use crate::sse::events::{ChatStreamEvent, SseFrame};
use crate::sse::parser::FrameAssembler;

/// State of one in-flight chat stream.
///
/// Once a terminal event (`Done` or `Error`) has been produced, every later
/// call returns nothing.
#[derive(Debug)]
pub struct StreamSession {
    correlation_id: String,
    decoder: Utf8Decoder,
    lines: LineBuffer,
    assembler: FrameAssembler,
    dispatcher: Dispatcher,
    terminated: bool,
    frames_seen: usize,
    payload_errors: usize,
}

impl StreamSession {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self::with_max_line_bytes(correlation_id, DEFAULT_MAX_LINE_BYTES)
    }

    pub fn with_max_line_bytes(correlation_id: impl Into<String>, max_line_bytes: usize) -> Self {
        let correlation_id = correlation_id.into();
        Self {
            dispatcher: Dispatcher::with_correlation_id(correlation_id.clone()),
            correlation_id,
            decoder: Utf8Decoder::new(),
            lines: LineBuffer::new(max_line_bytes),
            assembler: FrameAssembler::new(),
            terminated: false,
            frames_seen: 0,
            payload_errors: 0,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// True after `Done` or `Error` was produced.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Latest content snapshot delivered so far.
    pub fn last_content(&self) -> Option<&str> {
        self.dispatcher.last_content()
    }

    /// Frames dispatched so far.
    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// Payloads dropped as unparseable so far.
    pub fn payload_errors(&self) -> usize {
        self.payload_errors
    }

    /// Process one body chunk, returning the events it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ChatStreamEvent> {
        if self.terminated {
            return Vec::new();
        }

        let text = self.decoder.decode(chunk);
        let lines = match self.lines.feed(&text) {
            Ok(lines) => lines,
            Err(e) => return self.fail(e).into_iter().collect(),
        };

        let mut events = Vec::new();
        for line in lines {
            self.process_line(&line, &mut events);
            if self.terminated {
                break;
            }
        }
        events
    }

    /// Signal end of the body.
    ///
    /// An unterminated last line is processed as if it ended with a newline.
    /// Truncated UTF-8 fails the session. A stream that ends without `done`
    /// produces no extra event.
    pub fn finish(&mut self) -> Vec<ChatStreamEvent> {
        if self.terminated {
            return Vec::new();
        }

        if let Err(e) = self.decoder.finish() {
            return self.fail(e).into_iter().collect();
        }

        let mut events = Vec::new();
        if let Some(line) = self.lines.take_remaining() {
            self.process_line(&line, &mut events);
        }
        if !self.terminated {
            if let Some(err) = self.assembler.finish() {
                self.payload_errors += 1;
                tracing::warn!(
                    correlation_id = %self.correlation_id,
                    error = %err,
                    "Dropping incomplete payload at end of stream"
                );
            }
            tracing::debug!(
                correlation_id = %self.correlation_id,
                frames = self.frames_seen,
                "Chat stream ended without done event"
            );
        }
        events
    }

    /// Terminate with `error`, unless already terminated.
    pub fn fail(&mut self, error: StreamError) -> Option<ChatStreamEvent> {
        if self.terminated {
            return None;
        }
        self.terminated = true;
        tracing::info!(
            correlation_id = %self.correlation_id,
            code = error.error_code(),
            error = %error,
            "Chat stream failed"
        );
        Some(ChatStreamEvent::Error(error))
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<ChatStreamEvent>) {
        match self.assembler.feed_line(line) {
            Ok(Some(frame)) => self.dispatch(frame, events),
            Ok(None) => {}
            Err(e) => {
                self.payload_errors += 1;
                tracing::warn!(
                    correlation_id = %self.correlation_id,
                    error = %e,
                    "Dropping unparseable stream payload"
                );
            }
        }
    }

    fn dispatch(&mut self, frame: SseFrame, events: &mut Vec<ChatStreamEvent>) {
        self.frames_seen += 1;
        tracing::debug!(
            correlation_id = %self.correlation_id,
            event_type = frame.event_name(),
            "Stream frame"
        );

        match self.dispatcher.dispatch(frame) {
            Ok(Some(event)) => {
                if event.is_terminal() {
                    self.terminated = true;
                    if let ChatStreamEvent::Done(_) = event {
                        tracing::info!(
                            correlation_id = %self.correlation_id,
                            frames = self.frames_seen,
                            "Chat stream completed"
                        );
                    }
                }
                events.push(event);
            }
            Ok(None) => {}
            Err(e) => {
                self.payload_errors += 1;
                tracing::warn!(
                    correlation_id = %self.correlation_id,
                    error = %e,
                    "Dropping malformed stream event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepStatus;

    const EXAMPLE_STREAM: &str = concat!(
        "event: thinking_start\n",
        "data: {}\n",
        "\n",
        "event: thinking_step\n",
        "data: {\"step\":{\"id\":\"1\",\"agent\":\"planner\",\"action\":\"analyze\",\"status\":\"in_progress\"}}\n",
        "\n",
        "event: content\n",
        "data: {\"content\":\"Hello\"}\n",
        "\n",
        "event: done\n",
        "data: {\"correlation_id\":\"abc\",\"conversation_id\":\"c1\"}\n",
        "\n",
    );

    fn run_chunks(chunks: &[&[u8]]) -> Vec<ChatStreamEvent> {
        let mut session = StreamSession::new("test-session");
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(session.feed(chunk));
        }
        events.extend(session.finish());
        events
    }

    fn assert_example_events(events: &[ChatStreamEvent]) {
        assert_eq!(events.len(), 4, "events: {:?}", events);
        assert_eq!(events[0], ChatStreamEvent::ThinkingStart);
        match &events[1] {
            ChatStreamEvent::ThinkingStep(step) => {
                assert_eq!(step.id, "1");
                assert_eq!(step.status, StepStatus::InProgress);
            }
            other => panic!("Expected ThinkingStep, got {:?}", other),
        }
        assert_eq!(events[2], ChatStreamEvent::Content("Hello".to_string()));
        match &events[3] {
            ChatStreamEvent::Done(envelope) => {
                assert_eq!(envelope.content, "Hello");
                assert_eq!(envelope.correlation_id, "abc");
                assert_eq!(envelope.conversation_id(), Some("c1"));
            }
            other => panic!("Expected Done, got {:?}", other),
        }
    }

    #[test]
    fn test_example_stream_single_chunk() {
        let events = run_chunks(&[EXAMPLE_STREAM.as_bytes()]);
        assert_example_events(&events);
    }

    #[test]
    fn test_example_stream_byte_by_byte() {
        let bytes = EXAMPLE_STREAM.as_bytes();
        let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_example_events(&run_chunks(&chunks));
    }

    #[test]
    fn test_every_two_way_split_is_equivalent() {
        let bytes = EXAMPLE_STREAM.as_bytes();
        let whole = run_chunks(&[bytes]);
        for split in 1..bytes.len() {
            let (a, b) = bytes.split_at(split);
            assert_eq!(run_chunks(&[a, b]), whole, "split at {}", split);
        }
    }

    #[test]
    fn test_multibyte_content_split_inside_character() {
        let stream = "event: content\ndata: {\"content\":\"Prüfung 🚀 bestanden\"}\n\n";
        let bytes = stream.as_bytes();
        let rocket_start = stream.find('🚀').unwrap();

        let events = run_chunks(&[&bytes[..rocket_start + 2], &bytes[rocket_start + 2..]]);
        assert_eq!(
            events,
            vec![ChatStreamEvent::Content("Prüfung 🚀 bestanden".to_string())]
        );
    }

    #[test]
    fn test_step_upsert_events_pass_through_in_order() {
        let stream = concat!(
            "event: thinking_step\n",
            "data: {\"step\":{\"id\":\"1\",\"agent\":\"a\",\"action\":\"x\",\"status\":\"in_progress\"}}\n",
            "event: thinking_step\n",
            "data: {\"step\":{\"id\":\"2\",\"parent_id\":\"1\",\"agent\":\"b\",\"action\":\"y\",\"status\":\"pending\"}}\n",
            "event: thinking_step\n",
            "data: {\"step\":{\"id\":\"1\",\"agent\":\"a\",\"action\":\"x\",\"status\":\"complete\",\"duration_ms\":40}}\n",
        );

        let ids: Vec<(String, StepStatus)> = run_chunks(&[stream.as_bytes()])
            .into_iter()
            .filter_map(|e| match e {
                ChatStreamEvent::ThinkingStep(step) => Some((step.id, step.status)),
                _ => None,
            })
            .collect();

        assert_eq!(
            ids,
            vec![
                ("1".to_string(), StepStatus::InProgress),
                ("2".to_string(), StepStatus::Pending),
                ("1".to_string(), StepStatus::Complete),
            ]
        );
    }

    #[test]
    fn test_fractional_duration_step_is_forwarded() {
        let mut session = StreamSession::new("abc");
        let events = session.feed(concat!(
            "event: thinking_step\n",
            "data: {\"step\":{\"id\":\"1\",\"agent\":\"a\",\"action\":\"x\",",
            "\"status\":\"complete\",\"duration_ms\":12.5}}\n",
        ).as_bytes());

        assert_eq!(session.payload_errors(), 0);
        match events.as_slice() {
            [ChatStreamEvent::ThinkingStep(step)] => {
                assert_eq!(step.status, StepStatus::Complete);
                assert_eq!(step.duration_ms, Some(13));
            }
            other => panic!("Expected one ThinkingStep, got {:?}", other),
        }
    }

    #[test]
    fn test_nothing_after_error() {
        let stream = concat!(
            "event: content\ndata: {\"content\":\"partial\"}\n\n",
            "event: error\ndata: {\"message\":\"Agent crashed\",\"code\":\"AGENT\"}\n\n",
            "event: content\ndata: {\"content\":\"more\"}\n\n",
            "event: done\ndata: {}\n\n",
        );

        let mut session = StreamSession::new("s");
        let events = session.feed(stream.as_bytes());

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            ChatStreamEvent::Error(StreamError::BackendError {
                code: Some("AGENT".to_string()),
                message: "Agent crashed".to_string(),
            })
        );
        assert!(session.is_terminated());
        assert!(session.feed(b"event: content\ndata: {\"content\":\"x\"}\n").is_empty());
        assert!(session.finish().is_empty());
        assert!(session.fail(StreamError::Cancelled).is_none());
    }

    #[test]
    fn test_nothing_after_done() {
        let stream = "event: done\ndata: {}\n\nevent: content\ndata: {\"content\":\"late\"}\n";
        let events = run_chunks(&[stream.as_bytes()]);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ChatStreamEvent::Done(_)));
    }

    #[test]
    fn test_done_without_content_uses_payload_content() {
        let events = run_chunks(&[b"event: done\ndata: {\"content\":\"Direct\"}\n"]);
        match &events[0] {
            ChatStreamEvent::Done(envelope) => {
                assert_eq!(envelope.content, "Direct");
                assert_eq!(envelope.correlation_id, "test-session");
            }
            other => panic!("Expected Done, got {:?}", other),
        }
    }

    #[test]
    fn test_payload_completed_by_later_line() {
        let stream = concat!(
            "event: content\n",
            "data: {\"content\":\n",
            "data: \"joined\"}\n",
        );
        let events = run_chunks(&[stream.as_bytes()]);
        assert_eq!(events, vec![ChatStreamEvent::Content("joined".to_string())]);
    }

    #[test]
    fn test_never_completed_payload_is_dropped_and_stream_continues() {
        let stream = concat!(
            "event: content\n",
            "data: {\"content\":\"lost\n",
            "\n",
            "event: content\n",
            "data: {\"content\":\"kept\"}\n",
        );
        let mut session = StreamSession::new("s");
        let events = session.feed(stream.as_bytes());

        assert_eq!(events, vec![ChatStreamEvent::Content("kept".to_string())]);
        assert_eq!(session.payload_errors(), 1);
        assert!(!session.is_terminated());
    }

    #[test]
    fn test_done_sentinel_alone_yields_nothing() {
        let mut session = StreamSession::new("s");
        assert!(session.feed(b"data: [DONE]\n\n").is_empty());
        assert!(session.finish().is_empty());
        assert!(!session.is_terminated());
    }

    #[test]
    fn test_unterminated_last_line_is_processed() {
        let events = run_chunks(&[b"event: done\ndata: {\"correlation_id\":\"z\"}"]);
        assert!(matches!(
            &events[..],
            [ChatStreamEvent::Done(envelope)] if envelope.correlation_id == "z"
        ));
    }

    #[test]
    fn test_truncated_utf8_at_end_is_terminal() {
        let mut session = StreamSession::new("s");
        assert!(session.feed(b"event: content\n\xf0\x9f").is_empty());
        assert_eq!(
            session.finish(),
            vec![ChatStreamEvent::Error(StreamError::InvalidUtf8 {
                trailing_bytes: 2
            })]
        );
        assert!(session.is_terminated());
    }

    #[test]
    fn test_line_too_long_is_terminal() {
        let mut session = StreamSession::with_max_line_bytes("s", 16);
        let events = session.feed(b"data: {\"content\":\"this line is far too long\"}\n");
        assert_eq!(
            events,
            vec![ChatStreamEvent::Error(StreamError::LineTooLong { limit: 16 })]
        );
        assert!(session.feed(b"data: {}\n").is_empty());
    }

    #[test]
    fn test_fail_emits_once() {
        let mut session = StreamSession::new("s");
        assert_eq!(
            session.fail(StreamError::Cancelled),
            Some(ChatStreamEvent::Error(StreamError::Cancelled))
        );
        assert!(session.fail(StreamError::Cancelled).is_none());
    }

    #[test]
    fn test_crlf_stream() {
        let crlf = EXAMPLE_STREAM.replace('\n', "\r\n");
        assert_example_events(&run_chunks(&[crlf.as_bytes()]));
    }
}
