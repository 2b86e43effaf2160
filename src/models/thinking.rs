use serde::{Deserialize, Serialize};

/// Progress of a single thinking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
    Error,
}

impl StepStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, StepStatus::Complete | StepStatus::Error)
    }

    /// Short glyph for terminal output.
    pub fn symbol(&self) -> &'static str {
        match self {
            StepStatus::Pending => "·",
            StepStatus::InProgress => "…",
            StepStatus::Complete => "✓",
            StepStatus::Error => "✗",
        }
    }
}

/// One agent action reported while the backend is reasoning.
///
/// Steps are identified by `id`; later sightings of the same id replace the
/// earlier one. `parent_id` nests a step under another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingStep {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "super::deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub agent: String,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(
        default,
        deserialize_with = "super::deserialize_duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_ms: Option<u64>,
}
