use super::CopilotClient;
use crate::error::CopilotResult;
use crate::models::HealthStatus;

impl CopilotClient {
    pub async fn health(&self) -> CopilotResult<HealthStatus> {
        self.get_json("/api/health", "health").await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::api::CopilotClient;
    use crate::config::ClientConfig;
    use crate::traits::Response;

    #[tokio::test]
    async fn test_health_degraded() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://localhost:8000/api/health",
            MockResponse::Success(Response::new(
                200,
                Bytes::from(r#"{"status":"degraded","version":"1.4.2","components":{"llm":"down"}}"#),
            )),
        );
        let client = CopilotClient::with_http_client(ClientConfig::default(), Arc::new(mock));

        let health = client.health().await.unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.version.as_deref(), Some("1.4.2"));
    }
}
