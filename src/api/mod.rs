//! Client for the QA Copilot backend.
//!
//! [`CopilotClient`] wraps an [`HttpClient`] and the [`ClientConfig`]. Each
//! resource lives in its own submodule as an `impl CopilotClient` block:
//!
//! - `chat` - streaming and non-streaming chat
//! - `conversations` - saved conversations
//! - `workspaces` - workspaces and their files
//! - `jobs` - test execution jobs
//! - `schedules` - recurring runs
//! - `reports` - generated HTML reports
//! - `health` - backend health

pub mod chat;
mod conversations;
mod health;
mod jobs;
mod reports;
mod schedules;
mod workspaces;

pub use chat::spawn_chat_stream;
pub use jobs::JobFilter;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{CopilotError, CopilotResult, ErrorContext, NetworkError, ResultExt};
use crate::traits::{Headers, HttpClient, Response};

pub const HEADER_CORRELATION_ID: &str = "X-Correlation-ID";
pub const HEADER_CONVERSATION_ID: &str = "X-Conversation-ID";

/// HTTP methods used against the REST resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Client for the QA Copilot backend.
///
/// Cheap to clone; clones share the underlying HTTP client.
#[derive(Clone)]
pub struct CopilotClient {
    http: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl std::fmt::Debug for CopilotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopilotClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl CopilotClient {
    /// Client backed by reqwest, configured from `config`.
    pub fn new(config: ClientConfig) -> CopilotResult<Self> {
        config.validate()?;
        let http = ReqwestHttpClient::from_config(&config)
            .map_err(|e| CopilotError::configuration(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self::with_http_client(config, Arc::new(http)))
    }

    /// Client using an injected transport.
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// Headers sent with every REST call.
    pub(crate) fn json_headers(correlation_id: &str) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert(HEADER_CORRELATION_ID.to_string(), correlation_id.to_string());
        headers
    }

    /// Perform one REST call and return the successful response.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        operation: &str,
    ) -> CopilotResult<Response> {
        self.request_with(method, path, body, operation, new_correlation_id(), Headers::new())
            .await
    }

    /// Like [`CopilotClient::request`] with a given correlation id and extra headers.
    async fn request_with(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        operation: &str,
        correlation_id: String,
        extra_headers: Headers,
    ) -> CopilotResult<Response> {
        let url = self.url(path);
        let mut headers = Self::json_headers(&correlation_id);
        headers.extend(extra_headers);
        let body = body.unwrap_or_default();
        let context = || {
            ErrorContext::new(operation)
                .with_resource(path)
                .with_component("api")
                .with_correlation_id(correlation_id.clone())
        };

        tracing::debug!(
            method = method.as_str(),
            %url,
            correlation_id = %correlation_id,
            "{}",
            operation
        );

        let result = match method {
            Method::Get => self.http.get(&url, &headers).await,
            Method::Post => self.http.post(&url, &body, &headers).await,
            Method::Put => self.http.put(&url, &body, &headers).await,
            Method::Patch => self.http.patch(&url, &body, &headers).await,
            Method::Delete => self.http.delete(&url, &headers).await,
        };

        let response = result
            .map_err(|e| NetworkError::from_http(e, &url))
            .with_context(context)?;

        if response.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .unwrap_or_default()
            .trim()
            .to_string();
        tracing::warn!(
            method = method.as_str(),
            %url,
            status = response.status,
            correlation_id = %correlation_id,
            "Request failed"
        );

        let err = if response.status == 404 {
            NetworkError::NotFound {
                resource: path.to_string(),
            }
        } else {
            NetworkError::HttpStatus {
                status: response.status,
                message: error_detail(&message),
            }
        };
        Err(CopilotError::from(err).with_context(context()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> CopilotResult<T> {
        let response = self.request(Method::Get, path, None, operation).await?;
        decode_json(&response, operation)
    }

    /// GET a list that may arrive bare or wrapped as `{"<key>": [...]}`.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        operation: &str,
    ) -> CopilotResult<Vec<T>> {
        let value: Value = self.get_json(path, operation).await?;
        decode_list(value, key, operation)
    }

    pub(crate) async fn get_text(&self, path: &str, operation: &str) -> CopilotResult<String> {
        let response = self.request(Method::Get, path, None, operation).await?;
        response.text().map_err(|e| {
            CopilotError::from(NetworkError::InvalidResponse {
                message: format!("{}: body is not UTF-8: {}", operation, e),
            })
        })
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> CopilotResult<T> {
        let body = serde_json::to_string(body)?;
        let response = self
            .request(Method::Post, path, Some(body), operation)
            .await?;
        decode_json(&response, operation)
    }

    /// POST without a body, decoding the answer.
    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> CopilotResult<T> {
        let response = self.request(Method::Post, path, None, operation).await?;
        decode_json(&response, operation)
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> CopilotResult<T> {
        let body = serde_json::to_string(body)?;
        let response = self.request(Method::Put, path, Some(body), operation).await?;
        decode_json(&response, operation)
    }

    /// PUT whose answer is not needed.
    pub(crate) async fn put_unit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> CopilotResult<()> {
        let body = serde_json::to_string(body)?;
        self.request(Method::Put, path, Some(body), operation)
            .await
            .map(|_| ())
    }

    /// PATCH whose answer is not needed.
    pub(crate) async fn patch_unit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> CopilotResult<()> {
        let body = serde_json::to_string(body)?;
        self.request(Method::Patch, path, Some(body), operation)
            .await
            .map(|_| ())
    }

    pub(crate) async fn delete_unit(&self, path: &str, operation: &str) -> CopilotResult<()> {
        self.request(Method::Delete, path, None, operation)
            .await
            .map(|_| ())
    }
}

/// Fresh correlation id for one request.
pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Percent-encode one path segment.
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Percent-encode a `/`-separated file path segment by segment.
pub(crate) fn encode_path(raw: &str) -> String {
    raw.trim_start_matches('/')
        .split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_json<T: DeserializeOwned>(response: &Response, operation: &str) -> CopilotResult<T> {
    response.json().map_err(|e| {
        CopilotError::from(NetworkError::InvalidResponse {
            message: format!("{}: {}", operation, e),
        })
    })
}

fn decode_list<T: DeserializeOwned>(value: Value, key: &str, operation: &str) -> CopilotResult<Vec<T>> {
    let items = match value {
        Value::Array(_) => value,
        Value::Object(mut obj) => match obj.remove(key).or_else(|| obj.remove("items")) {
            Some(items) => items,
            None => {
                return Err(NetworkError::InvalidResponse {
                    message: format!("{}: expected a list or an object with '{}'", operation, key),
                }
                .into())
            }
        },
        Value::Null => return Ok(Vec::new()),
        other => other,
    };

    serde_json::from_value(items).map_err(|e| {
        CopilotError::from(NetworkError::InvalidResponse {
            message: format!("{}: {}", operation, e),
        })
    })
}

/// Pull the human-readable part out of an error body.
///
/// FastAPI-style backends answer `{"detail": "..."}`; anything else is
/// passed through unchanged.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => obj
            .get("detail")
            .or_else(|| obj.get("message"))
            .or_else(|| obj.get("error"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    }
}
