use super::{segment, CopilotClient};
use crate::error::CopilotResult;
use crate::models::{Schedule, ScheduleInput};

impl CopilotClient {
    pub async fn list_schedules(&self) -> CopilotResult<Vec<Schedule>> {
        self.get_list("/api/schedules", "schedules", "list_schedules")
            .await
    }

    pub async fn get_schedule(&self, id: &str) -> CopilotResult<Schedule> {
        self.get_json(&format!("/api/schedules/{}", segment(id)), "get_schedule")
            .await
    }

    /// Create a schedule. The cron expression is validated by the backend.
    pub async fn create_schedule(&self, input: &ScheduleInput) -> CopilotResult<Schedule> {
        self.post_json("/api/schedules", input, "create_schedule")
            .await
    }

    /// Replace a schedule's settings.
    pub async fn update_schedule(&self, id: &str, input: &ScheduleInput) -> CopilotResult<Schedule> {
        self.put_json(
            &format!("/api/schedules/{}", segment(id)),
            input,
            "update_schedule",
        )
        .await
    }

    pub async fn delete_schedule(&self, id: &str) -> CopilotResult<()> {
        self.delete_unit(&format!("/api/schedules/{}", segment(id)), "delete_schedule")
            .await
    }

    /// Flip `enabled`; returns the updated schedule.
    pub async fn toggle_schedule(&self, id: &str) -> CopilotResult<Schedule> {
        self.post_empty(
            &format!("/api/schedules/{}/toggle", segment(id)),
            "toggle_schedule",
        )
        .await
    }
}
