//! Wire records exchanged with the QA Copilot backend.
//!
//! All records are snake_case JSON. Fields the backend may omit or send as
//! `null` are `Option`s or `#[serde(default)]`.

mod chat;
mod conversation;
mod health;
mod job;
mod preferences;
mod report;
mod schedule;
mod thinking;
mod workspace;

pub use chat::{ChatMessage, ChatRequest, ChatResponseEnvelope, ReasoningStep, Role};
pub use conversation::{Conversation, ConversationSummary, RenameConversation};
pub use health::HealthStatus;
pub use job::{Job, JobStatus};
pub use preferences::Preferences;
pub use report::ReportSummary;
pub use schedule::{Schedule, ScheduleInput};
pub use thinking::{StepStatus, ThinkingStep};
pub use workspace::{FileContent, NewWorkspace, Workspace, WorkspaceFile};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Helper to deserialize id as either string or integer
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Like [`deserialize_id`] for a list of ids.
pub(crate) fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "deserialize_id")] String);

    Option::<Vec<Id>>::deserialize(deserializer)
        .map(|ids| ids.unwrap_or_default().into_iter().map(|Id(id)| id).collect())
}

/// Like [`deserialize_id`] for an optional id.
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "deserialize_id")] String);

    Option::<Id>::deserialize(deserializer).map(|id| id.map(|Id(id)| id))
}

/// Helper to deserialize nullable strings as empty string
pub(crate) fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// Optional millisecond duration from any JSON number; fractions are
/// rounded and negatives read as zero.
pub(crate) fn deserialize_duration_ms<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(|ms| ms.map(|ms| ms.max(0.0).round() as u64))
}

/// Optional timestamp accepting RFC 3339 or a naive ISO-8601 form (read as UTC).
pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
