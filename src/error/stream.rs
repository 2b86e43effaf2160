//! Streaming-related error types.
//!
//! Every variant here is terminal for the chat stream it was raised on: the
//! driver delivers it as the last event and releases the connection.
//! Malformed `data:` payloads are not in this list; they are reported per
//! line and the stream keeps going (see [`crate::sse::SseParseError`]).

use std::fmt;

use crate::traits::HttpError;

/// Terminal chat-stream failures.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The request could not be opened.
    ConnectionFailed { message: String },

    /// The backend answered the stream request with a non-2xx status.
    HttpStatus { status: u16, message: String },

    /// The response carried no readable body.
    MissingBody,

    /// The transport failed while reading the body.
    ConnectionLost { message: String },

    /// The body ended inside a multi-byte UTF-8 sequence.
    InvalidUtf8 { trailing_bytes: usize },

    /// A single line grew past the configured limit.
    LineTooLong { limit: usize },

    /// Backend reported an error via an `error` event.
    BackendError {
        code: Option<String>,
        message: String,
    },

    /// No chunk arrived within the configured idle timeout.
    Timeout { idle_ms: u64 },

    /// The caller cancelled the stream.
    Cancelled,
}

impl StreamError {
    /// Check if sending the same message again could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::ConnectionFailed { .. }
            | StreamError::ConnectionLost { .. }
            | StreamError::Timeout { .. } => true,
            StreamError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// True when the stream ended because the caller asked it to.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionFailed { .. } => {
                "Unable to reach the Copilot backend. Please check the connection.".to_string()
            }
            StreamError::HttpStatus { status, .. } => {
                format!("The Copilot backend rejected the chat request (HTTP {}).", status)
            }
            StreamError::MissingBody => {
                "The Copilot backend returned an empty response.".to_string()
            }
            StreamError::ConnectionLost { .. } => {
                "The connection dropped while the answer was streaming.".to_string()
            }
            StreamError::InvalidUtf8 { .. } => {
                "The response ended with corrupted text.".to_string()
            }
            StreamError::LineTooLong { limit } => {
                format!("The response contained a line longer than {} bytes.", limit)
            }
            StreamError::BackendError { message, .. } => message.clone(),
            StreamError::Timeout { idle_ms } => {
                format!("No data received for {} ms. The stream was closed.", idle_ms)
            }
            StreamError::Cancelled => "The request was cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionFailed { .. } => "E_STREAM_CONN",
            StreamError::HttpStatus { .. } => "E_STREAM_HTTP",
            StreamError::MissingBody => "E_STREAM_NO_BODY",
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
            StreamError::InvalidUtf8 { .. } => "E_STREAM_UTF8",
            StreamError::LineTooLong { .. } => "E_STREAM_LINE",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
            StreamError::Timeout { .. } => "E_STREAM_TIMEOUT",
            StreamError::Cancelled => "E_STREAM_CANCEL",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionFailed { message } => {
                write!(f, "Failed to open stream: {}", message)
            }
            StreamError::HttpStatus { status, message } => {
                write!(f, "Stream request failed with HTTP {}: {}", status, message)
            }
            StreamError::MissingBody => write!(f, "Stream response has no body"),
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::InvalidUtf8 { trailing_bytes } => {
                write!(f, "Stream ended with {} undecodable bytes", trailing_bytes)
            }
            StreamError::LineTooLong { limit } => {
                write!(f, "Stream line exceeded {} bytes", limit)
            }
            StreamError::BackendError { code, message } => match code {
                Some(c) => write!(f, "Backend error [{}]: {}", c, message),
                None => write!(f, "Backend error: {}", message),
            },
            StreamError::Timeout { idle_ms } => {
                write!(f, "Stream idle for more than {} ms", idle_ms)
            }
            StreamError::Cancelled => write!(f, "Stream cancelled"),
        }
    }
}

impl std::error::Error for StreamError {}

/// Errors raised while opening the stream request.
impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => {
                StreamError::HttpStatus { status, message }
            }
            HttpError::MissingBody => StreamError::MissingBody,
            HttpError::Cancelled => StreamError::Cancelled,
            HttpError::ConnectionFailed(message)
            | HttpError::Timeout(message)
            | HttpError::InvalidUrl(message)
            | HttpError::Io(message)
            | HttpError::Other(message) => StreamError::ConnectionFailed { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lost_is_retryable() {
        let err = StreamError::ConnectionLost {
            message: "reset by peer".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_STREAM_LOST");
    }

    #[test]
    fn test_backend_error_user_message_is_backend_text() {
        let err = StreamError::BackendError {
            code: None,
            message: "Workspace PRD-100 is locked".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Workspace PRD-100 is locked");
        assert_eq!(err.to_string(), "Backend error: Workspace PRD-100 is locked");
    }

    #[test]
    fn test_backend_error_display_with_code() {
        let err = StreamError::BackendError {
            code: Some("rate_limit".to_string()),
            message: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error [rate_limit]: slow down");
    }

    #[test]
    fn test_from_http_error() {
        let err: StreamError = HttpError::ServerError {
            status: 502,
            message: "bad gateway".to_string(),
        }
        .into();
        assert_eq!(
            err,
            StreamError::HttpStatus {
                status: 502,
                message: "bad gateway".to_string()
            }
        );
        assert!(err.is_retryable());

        let err: StreamError = HttpError::MissingBody.into();
        assert_eq!(err, StreamError::MissingBody);

        let err: StreamError = HttpError::ConnectionFailed("refused".to_string()).into();
        assert!(matches!(err, StreamError::ConnectionFailed { .. }));
    }

    #[test]
    fn test_cancelled() {
        assert!(StreamError::Cancelled.is_cancelled());
        assert!(!StreamError::Cancelled.is_retryable());
        assert_eq!(StreamError::Cancelled.error_code(), "E_STREAM_CANCEL");
    }

    #[test]
    fn test_line_too_long_mentions_limit() {
        let err = StreamError::LineTooLong { limit: 1024 };
        assert!(err.user_message().contains("1024"));
        assert!(err.to_string().contains("1024"));
    }
}
