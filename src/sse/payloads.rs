//! Payload shapes of the recognized stream events.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct ContentPayload {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
    /// String or numeric code
    #[serde(default)]
    pub code: Option<Value>,
}

impl ErrorPayload {
    pub fn code_string(&self) -> Option<String> {
        match self.code.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

pub(crate) const DEFAULT_ERROR_MESSAGE: &str = "An error occurred while processing your request";
