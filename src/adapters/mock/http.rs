//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, canned body chunks or errors, and records every request.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for methods that carry one)
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a complete response
    Success(Response),
    /// Return an error
    Error(HttpError),
    /// Return a body delivered as these chunks
    Stream(Vec<Bytes>),
    /// Deliver the chunks, then fail the body with an error
    StreamThenError(Vec<Bytes>, HttpError),
    /// Deliver the chunks, then never complete
    StreamPending(Vec<Bytes>),
    /// Fail opening the stream with an error
    StreamError(HttpError),
    /// Succeed without a readable body
    NoBody,
}

/// Mock HTTP client for testing.
///
/// Responses are looked up by `(method, url)` first, then by URL for any
/// method, using the longest configured prefix. Queued responses for a URL
/// are consumed before the static ones, which lets tests script a sequence
/// of polls.
///
/// # Example
///
/// ```ignore
/// use qa_copilot::adapters::mock::{MockHttpClient, MockResponse};
/// use qa_copilot::traits::{HttpClient, Response, Headers};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost:8000/api/health",
///     MockResponse::Success(Response::new(200, Bytes::from(r#"{"status":"ok"}"#))),
/// );
///
/// let response = client.get("http://localhost:8000/api/health", &Headers::new()).await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Configured responses keyed by optional method and URL pattern
    responses: Arc<Mutex<HashMap<(Option<String>, String), MockResponse>>>,
    /// One-shot responses consumed in order, keyed by URL
    queued: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL (prefix) regardless of method.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert((None, url.to_string()), response);
    }

    /// Set a response for one method on a URL (prefix).
    pub fn set_method_response(&self, method: &str, url: &str, response: MockResponse) {
        lock(&self.responses).insert((Some(method.to_uppercase()), url.to_string()), response);
    }

    /// Queue a one-shot response for an exact URL.
    pub fn queue_response(&self, url: &str, response: MockResponse) {
        lock(&self.queued)
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    /// Clear all configured responses.
    pub fn clear_responses(&self) {
        lock(&self.responses).clear();
        lock(&self.queued).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        lock(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, method: &str, url: &str) -> Option<MockResponse> {
        if let Some(queue) = lock(&self.queued).get_mut(url) {
            if let Some(response) = queue.pop_front() {
                return Some(response);
            }
        }

        let responses = lock(&self.responses);
        let method_key = Some(method.to_string());

        for key in [&method_key, &None] {
            if let Some(response) = responses.get(&(key.clone(), url.to_string())) {
                return Some(response.clone());
            }
        }

        let prefix_match = responses
            .iter()
            .filter(|((m, pattern), _)| {
                (m.is_none() || m.as_deref() == Some(method)) && url.starts_with(pattern.as_str())
            })
            .max_by_key(|((m, pattern), _)| (pattern.len(), m.is_some()))
            .map(|(_, response)| response.clone());
        if prefix_match.is_some() {
            return prefix_match;
        }

        lock(&self.default_response).clone()
    }

    fn respond(&self, method: &str, url: &str) -> Result<Response, HttpError> {
        match self.get_response(method, url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) | Some(MockResponse::StreamError(err)) => Err(err),
            Some(MockResponse::NoBody) => Ok(Response::new(204, Bytes::new())),
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.respond("GET", url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.respond("POST", url)
    }

    async fn put(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("PUT", url, headers, Some(body.to_string()));
        self.respond("PUT", url)
    }

    async fn patch(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record_request("PATCH", url, headers, Some(body.to_string()));
        self.respond("PATCH", url)
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("DELETE", url, headers, None);
        self.respond("DELETE", url)
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        use futures::stream::{self, StreamExt};

        self.record_request("POST", url, headers, Some(body.to_string()));

        match self.get_response("POST", url) {
            Some(MockResponse::Stream(chunks)) => {
                Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
            }
            Some(MockResponse::StreamThenError(chunks, err)) => {
                let body = stream::iter(chunks.into_iter().map(Ok))
                    .chain(stream::once(async move { Err(err) }));
                Ok(Box::pin(body))
            }
            Some(MockResponse::StreamPending(chunks)) => {
                let body = stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending());
                Ok(Box::pin(body))
            }
            Some(MockResponse::StreamError(err)) | Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::NoBody) => Err(HttpError::MissingBody),
            Some(MockResponse::Success(response)) if !response.is_success() => {
                Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text().unwrap_or_default(),
                })
            }
            Some(MockResponse::Success(response)) => {
                Ok(Box::pin(stream::iter(vec![Ok(response.body)])))
            }
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
