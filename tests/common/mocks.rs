//! Mock transport helpers.
//!
//! Re-exports the mock adapters from `qa_copilot::adapters::mock` and adds
//! a small builder for canned responses.

pub use qa_copilot::adapters::mock::{InMemoryPreferences, MockHttpClient, MockResponse};
pub use qa_copilot::traits::{HttpError, Response};

use bytes::Bytes;

/// Configuration for setting up mock HTTP responses.
#[allow(dead_code)]
pub struct MockHttpConfig {
    client: MockHttpClient,
}

#[allow(dead_code)]
impl MockHttpConfig {
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Configures a JSON response for `url`.
    pub fn with_json_response(self, url: &str, status: u16, json: serde_json::Value) -> Self {
        self.client.set_response(
            url,
            MockResponse::Success(Response::new(status, Bytes::from(json.to_string()))),
        );
        self
    }

    /// Queues a JSON response for `url`, served once before any fixed response.
    pub fn queue_json(self, url: &str, json: serde_json::Value) -> Self {
        self.client.queue_response(
            url,
            MockResponse::Success(Response::new(200, Bytes::from(json.to_string()))),
        );
        self
    }

    /// Configures a chat stream body delivered in the given chunks.
    pub fn with_stream(self, url: &str, chunks: Vec<Vec<u8>>) -> Self {
        self.client.set_response(
            url,
            MockResponse::Stream(chunks.into_iter().map(Bytes::from).collect()),
        );
        self
    }

    pub fn build(self) -> MockHttpClient {
        self.client
    }
}
