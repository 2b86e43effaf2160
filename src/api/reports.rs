use super::{segment, CopilotClient};
use crate::error::CopilotResult;
use crate::models::ReportSummary;

impl CopilotClient {
    pub async fn list_reports(&self) -> CopilotResult<Vec<ReportSummary>> {
        self.get_list("/api/reports", "reports", "list_reports")
            .await
    }

    /// The rendered HTML report.
    pub async fn fetch_report(&self, id: &str) -> CopilotResult<String> {
        self.get_text(&format!("/api/reports/{}", segment(id)), "fetch_report")
            .await
    }
}
