use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Outbound chat request.
///
/// Serializes to the request body `{messages, correlation_id, workspace_ids?}`.
/// The conversation id travels in the `X-Conversation-ID` header only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing)]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workspace_ids: Vec<String>,
}

impl ChatRequest {
    /// A request carrying a single user message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(message)],
            ..Default::default()
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_workspaces(mut self, workspace_ids: Vec<String>) -> Self {
        self.workspace_ids = workspace_ids;
        self
    }
}

/// One entry of the backend's reasoning trace.
///
/// The trace is informational and its shape varies by agent, so only the
/// common fields are typed and everything else is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Final assistant answer for one chat turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponseEnvelope {
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_chain: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_trace: Option<Vec<ReasoningStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_plan: Option<Value>,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub correlation_id: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ChatResponseEnvelope {
    /// Conversation id assigned by the backend, once persisted.
    pub fn conversation_id(&self) -> Option<&str> {
        self.metadata.get("conversation_id").and_then(Value::as_str)
    }

    /// Build an envelope from a `done` (or non-streaming chat) payload.
    ///
    /// `content` wins over the payload's own `content` when given. A
    /// top-level `conversation_id` is copied into `metadata`, and an absent
    /// `correlation_id` falls back to `fallback_correlation_id`.
    pub fn from_payload(
        payload: &Value,
        content: Option<String>,
        fallback_correlation_id: Option<&str>,
    ) -> Self {
        let field = |name: &str| payload.get(name).filter(|v| !v.is_null());

        let content = content
            .or_else(|| field("content").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();

        let correlation_id = field("correlation_id")
            .and_then(value_to_id)
            .or_else(|| fallback_correlation_id.map(str::to_string))
            .unwrap_or_default();

        let agent_chain = field("agent_chain").and_then(Value::as_array).map(|chain| {
            chain
                .iter()
                .filter_map(|agent| match agent {
                    Value::String(name) => Some(name.clone()),
                    Value::Object(obj) => obj
                        .get("agent")
                        .or_else(|| obj.get("name"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        });

        let reasoning_trace = field("reasoning_trace").and_then(Value::as_array).map(|steps| {
            steps
                .iter()
                .filter_map(|step| match step {
                    Value::String(text) => Some(ReasoningStep {
                        agent: None,
                        action: None,
                        content: Some(text.clone()),
                        extra: Map::new(),
                    }),
                    other => serde_json::from_value(other.clone()).ok(),
                })
                .collect()
        });

        let mut metadata = field("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if let Some(conversation_id) = field("conversation_id").and_then(value_to_id) {
            metadata.insert("conversation_id".to_string(), Value::String(conversation_id));
        }

        Self {
            content,
            agent_chain,
            reasoning_trace,
            test_plan: field("test_plan").cloned(),
            correlation_id,
            metadata,
        }
    }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
