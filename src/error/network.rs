//! Network-related error types.
//!
//! Errors raised by plain request/response calls against the Copilot REST
//! resources (workspaces, jobs, schedules, reports, conversations, health).

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Could not reach the backend.
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    Timeout { operation: String, message: String },

    /// Backend answered with a non-2xx status.
    HttpStatus { status: u16, message: String },

    /// Backend answered 404 for a specific resource.
    NotFound { resource: String },

    /// Body did not match the expected shape.
    InvalidResponse { message: String },

    /// Request was cancelled before completion.
    Cancelled,

    /// Anything else reported by the transport.
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::NotFound { .. } => false,
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { url, .. } => {
                format!("Unable to reach the Copilot backend at '{}'.", url)
            }
            NetworkError::Timeout { operation, .. } => {
                format!("The {} request timed out. The backend may be overloaded.", operation)
            }
            NetworkError::HttpStatus { status, message } => match *status {
                400 | 422 => format!("The backend rejected the request: {}", message),
                401 | 403 => "The backend refused access to this resource.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => "The backend is experiencing issues. Please try again later.".to_string(),
                _ => format!("The backend returned HTTP {}.", status),
            },
            NetworkError::NotFound { resource } => format!("{} was not found.", resource),
            NetworkError::InvalidResponse { .. } => {
                "Received a response the client could not understand.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::NotFound { .. } => "E_NET_NOT_FOUND",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }

    /// Translate a transport error for the request to `url`.
    pub fn from_http(err: HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) | HttpError::InvalidUrl(message) => {
                NetworkError::ConnectionFailed {
                    url: url.to_string(),
                    message,
                }
            }
            HttpError::Timeout(message) => NetworkError::Timeout {
                operation: url.to_string(),
                message,
            },
            HttpError::ServerError { status: 404, .. } => NetworkError::NotFound {
                resource: url.to_string(),
            },
            HttpError::ServerError { status, message } => {
                NetworkError::HttpStatus { status, message }
            }
            HttpError::MissingBody => NetworkError::InvalidResponse {
                message: "response had no body".to_string(),
            },
            HttpError::Cancelled => NetworkError::Cancelled,
            HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation, message } => {
                write!(f, "{} timed out: {}", operation, message)
            }
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::NotFound { resource } => write!(f, "Not found: {}", resource),
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Cancelled => write!(f, "Request cancelled"),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}
