//! Common test utilities for integration tests.
//!
//! Fixtures shared by the API, streaming and poller tests: canned payloads,
//! client builders for the mock transport and for a wiremock server.

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use qa_copilot::api::CopilotClient;
use qa_copilot::config::ClientConfig;

/// The reference chat stream: thinking, one step, content, done.
pub const EXAMPLE_STREAM: &str = concat!(
    "event: thinking_start\n",
    "data: {}\n",
    "\n",
    "event: thinking_step\n",
    "data: {\"step\":{\"id\":\"1\",\"agent\":\"router\",\"action\":\"classify\",\"status\":\"in_progress\"}}\n",
    "\n",
    "event: content\n",
    "data: {\"content\":\"Hello\"}\n",
    "\n",
    "event: done\n",
    "data: {\"correlation_id\":\"abc\",\"conversation_id\":\"c1\"}\n",
    "\n",
);

/// Base URL the mock transport answers for.
pub const MOCK_BASE_URL: &str = "http://copilot.test";

/// Client on the in-process mock transport.
pub fn mock_client(mock: &MockHttpClient) -> CopilotClient {
    CopilotClient::with_http_client(
        ClientConfig::default().with_base_url(MOCK_BASE_URL),
        Arc::new(mock.clone()),
    )
}

/// Client talking real HTTP to `base_url` (usually a wiremock server).
#[allow(dead_code)]
pub fn http_client(base_url: &str) -> CopilotClient {
    CopilotClient::new(ClientConfig::default().with_base_url(base_url))
        .expect("client config should be valid")
}

/// Job JSON as the backend sends it.
#[allow(dead_code)]
pub fn job_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "status": status,
        "workspace_id": "ws-1",
        "test_ids": ["T-100", "T-101"],
        "created_at": "2026-10-18T22:00:00Z"
    })
}
