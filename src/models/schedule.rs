use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recurring test run. The cron expression is evaluated server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub cron_expression: String,
    #[serde(default, deserialize_with = "super::deserialize_id_list")]
    pub workspace_ids: Vec<String>,
    #[serde(default, deserialize_with = "super::deserialize_id_list")]
    pub test_ids: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_timestamp")]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::deserialize_timestamp")]
    pub next_run_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Writable subset of a schedule, used for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub name: String,
    pub cron_expression: String,
    #[serde(default)]
    pub workspace_ids: Vec<String>,
    #[serde(default)]
    pub test_ids: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl From<&Schedule> for ScheduleInput {
    fn from(schedule: &Schedule) -> Self {
        Self {
            name: schedule.name.clone(),
            cron_expression: schedule.cron_expression.clone(),
            workspace_ids: schedule.workspace_ids.clone(),
            test_ids: schedule.test_ids.clone(),
            enabled: schedule.enabled,
            description: schedule.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_round_trip_to_input() {
        let schedule: Schedule = serde_json::from_str(
            r#"{"id":"s1","name":"Nightly","cron_expression":"0 2 * * *",
                "workspace_ids":["ws-1"],"test_ids":["T1"],"enabled":true,
                "next_run_at":"2024-05-02T02:00:00Z"}"#,
        )
        .unwrap();

        let input = ScheduleInput::from(&schedule);
        assert_eq!(input.name, "Nightly");
        assert_eq!(input.cron_expression, "0 2 * * *");
        assert!(input.enabled);
        assert!(schedule.next_run_at.is_some());
    }

    #[test]
    fn test_input_defaults_to_enabled() {
        let input: ScheduleInput =
            serde_json::from_str(r#"{"name":"Weekly","cron_expression":"0 3 * * 1"}"#).unwrap();
        assert!(input.enabled);
        assert!(input.workspace_ids.is_empty());
    }
}
