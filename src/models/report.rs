use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generated HTML report, as listed by `GET /api/reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "super::deserialize_optional_id")]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}
