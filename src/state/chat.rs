//! Chat turn state
//!
//! Folds [`ChatStreamEvent`]s into a transcript the CLI (or any other
//! front end) can render.

use crate::error::StreamError;
use crate::models::{ChatMessage, ChatRequest, ChatResponseEnvelope, Conversation, Role};
use crate::sse::ChatStreamEvent;

use super::ThinkingTimeline;

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    timeline: ThinkingTimeline,
    /// Latest assistant text snapshot of the running turn
    live_content: String,
    conversation_id: Option<String>,
    last_envelope: Option<ChatResponseEnvelope>,
    last_error: Option<StreamError>,
    streaming: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a saved conversation.
    pub fn from_conversation(conversation: Conversation) -> Self {
        Self {
            conversation_id: Some(conversation.summary.id),
            messages: conversation.messages,
            ..Self::default()
        }
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Start a turn: clear the timeline, record the user message and build
    /// the outbound request carrying the whole history.
    pub fn begin_turn(&mut self, text: impl Into<String>, workspace_ids: &[String]) -> ChatRequest {
        self.timeline.clear();
        self.live_content.clear();
        self.last_error = None;
        self.streaming = true;
        self.messages.push(ChatMessage::user(text));

        ChatRequest {
            messages: self.messages.clone(),
            conversation_id: self.conversation_id.clone(),
            correlation_id: None,
            workspace_ids: workspace_ids.to_vec(),
        }
    }

    /// Fold one stream event into the state.
    ///
    /// An error ending a running turn withdraws its user message, so the
    /// next request never carries two user messages in a row.
    pub fn apply(&mut self, event: &ChatStreamEvent) {
        match event {
            ChatStreamEvent::ThinkingStart => self.timeline.start(),
            ChatStreamEvent::ThinkingStep(step) => {
                self.timeline.apply(step.clone());
            }
            ChatStreamEvent::ThinkingEnd => self.timeline.end(),
            ChatStreamEvent::Content(text) => self.live_content = text.clone(),
            ChatStreamEvent::Done(envelope) => self.complete(envelope.clone()),
            ChatStreamEvent::Error(error) => {
                tracing::debug!(error = %error, "Chat turn failed");
                if self.streaming
                    && self.messages.last().map(|m| m.role) == Some(Role::User)
                {
                    self.messages.pop();
                }
                self.timeline.end();
                self.streaming = false;
                self.last_error = Some(error.clone());
            }
        }
    }

    /// Record a finished answer, from a stream `done` or a non-streaming call.
    pub fn complete(&mut self, envelope: ChatResponseEnvelope) {
        self.timeline.end();
        self.streaming = false;
        self.live_content = envelope.content.clone();
        self.messages.push(ChatMessage::assistant(envelope.content.clone()));
        if let Some(id) = envelope.conversation_id() {
            self.conversation_id = Some(id.to_string());
        }
        self.last_envelope = Some(envelope);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn timeline(&self) -> &ThinkingTimeline {
        &self.timeline
    }

    pub fn live_content(&self) -> &str {
        &self.live_content
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn last_envelope(&self) -> Option<&ChatResponseEnvelope> {
        self.last_envelope.as_ref()
    }

    pub fn last_error(&self) -> Option<&StreamError> {
        self.last_error.as_ref()
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
}
