use super::{segment, CopilotClient};
use crate::error::CopilotResult;
use crate::models::{Job, JobStatus};

/// Query for `GET /api/jobs`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub limit: Option<u32>,
}

impl JobFilter {
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query string including the leading `?`, or empty.
    fn query(&self) -> String {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(format!("status={}", status.as_str()));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

impl CopilotClient {
    pub async fn list_jobs(&self, filter: &JobFilter) -> CopilotResult<Vec<Job>> {
        self.get_list(&format!("/api/jobs{}", filter.query()), "jobs", "list_jobs")
            .await
    }

    pub async fn get_job(&self, id: &str) -> CopilotResult<Job> {
        self.get_json(&format!("/api/jobs/{}", segment(id)), "get_job")
            .await
    }

    /// Ask the backend to stop a job; returns the job as it is afterwards.
    pub async fn cancel_job(&self, id: &str) -> CopilotResult<Job> {
        self.post_empty(&format!("/api/jobs/{}/cancel", segment(id)), "cancel_job")
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::config::ClientConfig;
    use crate::traits::Response;

    fn client_with(mock: &MockHttpClient) -> CopilotClient {
        CopilotClient::with_http_client(ClientConfig::default(), Arc::new(mock.clone()))
    }

    #[test]
    fn test_filter_query() {
        assert_eq!(JobFilter::default().query(), "");
        assert_eq!(
            JobFilter::default()
                .with_status(JobStatus::Running)
                .with_limit(10)
                .query(),
            "?status=running&limit=10"
        );
        assert_eq!(JobFilter::default().with_limit(5).query(), "?limit=5");
    }

    #[tokio::test]
    async fn test_list_jobs_with_filter() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://localhost:8000/api/jobs?status=failed",
            MockResponse::Success(Response::new(
                200,
                Bytes::from(r#"{"jobs":[{"id":42,"status":"failed","error":"RFC timeout"}]}"#),
            )),
        );

        let jobs = client_with(&mock)
            .list_jobs(&JobFilter::default().with_status(JobStatus::Failed))
            .await
            .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "42");
        assert_eq!(jobs[0].error.as_deref(), Some("RFC timeout"));
    }

    #[tokio::test]
    async fn test_cancel_job_posts_and_decodes() {
        let mock = MockHttpClient::new();
        mock.set_method_response(
            "POST",
            "http://localhost:8000/api/jobs/j-1/cancel",
            MockResponse::Success(Response::new(
                200,
                Bytes::from(r#"{"id":"j-1","status":"cancelled"}"#),
            )),
        );

        let job = client_with(&mock).cancel_job("j-1").await.unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(!job.is_active());
        assert_eq!(mock.get_requests()[0].method, "POST");
    }
}
