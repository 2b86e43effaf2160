//! Unified error handling for the Copilot client.
//!
//! - **Error Categories**: coarse classification for handling decisions
//! - **Domain errors**: network (REST), stream (chat SSE), system (filesystem)
//! - **Unified type**: `CopilotError` consolidates all of them
//! - **Context**: `ErrorContext` records operation, resource and correlation id
//! - **Result alias**: `CopilotResult<T>`
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout | Yes |
//! | Server | 5xx, backend `error` events | Yes |
//! | Client | Undecodable responses | No |
//! | User | Bad ids, 4xx, cancellation | No |
//! | System | Filesystem | No |
//! | Configuration | Bad settings | No |

mod category;
mod context;
mod copilot_error;
mod network;
mod result;
mod stream;
mod system;

pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use copilot_error::CopilotError;
pub use network::NetworkError;
pub use result::{CopilotResult, ResultExt};
pub use stream::StreamError;
pub use system::{classify_io_error, SystemError};

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_every_domain_error_has_code_and_message() {
        let errors: Vec<CopilotError> = vec![
            NetworkError::Timeout {
                operation: "list_jobs".to_string(),
                message: "30s".to_string(),
            }
            .into(),
            StreamError::MissingBody.into(),
            SystemError::NoHomeDirectory.into(),
            CopilotError::configuration("bad url"),
        ];

        for err in errors {
            assert!(!err.error_code().is_empty());
            assert!(!err.user_message().is_empty());
            assert!(!err.category().recovery_hint().is_empty());
        }
    }

    #[test]
    fn test_retry_logic() {
        let retryable: Vec<CopilotError> = vec![
            NetworkError::ConnectionFailed {
                url: "http://localhost:8000".to_string(),
                message: "refused".to_string(),
            }
            .into(),
            StreamError::ConnectionLost {
                message: "eof".to_string(),
            }
            .into(),
        ];
        for err in retryable {
            assert!(err.is_retryable(), "Expected {:?} to be retryable", err);
        }

        let permanent: Vec<CopilotError> = vec![
            StreamError::InvalidUtf8 { trailing_bytes: 1 }.into(),
            NetworkError::HttpStatus {
                status: 422,
                message: "bad cron".to_string(),
            }
            .into(),
            SystemError::NoHomeDirectory.into(),
        ];
        for err in permanent {
            assert!(!err.is_retryable(), "Expected {:?} to not be retryable", err);
        }
    }
}
