//! Unified error type for the Copilot client.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::stream::StreamError;
use super::system::SystemError;
use crate::traits::PreferencesError;

/// Unified error type for the Copilot client.
///
/// Consolidates the domain errors so callers get one place for
/// categorization, retry decisions and operator messages.
#[derive(Debug)]
pub enum CopilotError {
    /// REST request/response failures.
    Network(NetworkError),

    /// Terminal chat-stream failures.
    Stream(StreamError),

    /// Local filesystem errors.
    System(SystemError),

    /// Preferences store failures.
    Preferences(PreferencesError),

    /// Invalid configuration or arguments.
    Configuration { message: String },

    /// Wrapped error with additional context.
    WithContext {
        error: Box<CopilotError>,
        context: ErrorContext,
    },
}

impl CopilotError {
    /// Shorthand for configuration errors.
    pub fn configuration(message: impl Into<String>) -> Self {
        CopilotError::Configuration {
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CopilotError::Network(err) => match err {
                NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. } => {
                    ErrorCategory::Network
                }
                NetworkError::HttpStatus { status, .. } if *status >= 500 => ErrorCategory::Server,
                NetworkError::HttpStatus { .. }
                | NetworkError::NotFound { .. }
                | NetworkError::Cancelled => ErrorCategory::User,
                NetworkError::InvalidResponse { .. } => ErrorCategory::Client,
                NetworkError::Other { .. } => ErrorCategory::Network,
            },
            CopilotError::Stream(err) => match err {
                StreamError::ConnectionFailed { .. }
                | StreamError::ConnectionLost { .. }
                | StreamError::Timeout { .. } => ErrorCategory::Network,
                StreamError::HttpStatus { .. }
                | StreamError::MissingBody
                | StreamError::BackendError { .. } => ErrorCategory::Server,
                StreamError::InvalidUtf8 { .. } | StreamError::LineTooLong { .. } => {
                    ErrorCategory::Client
                }
                StreamError::Cancelled => ErrorCategory::User,
            },
            CopilotError::System(_) | CopilotError::Preferences(_) => ErrorCategory::System,
            CopilotError::Configuration { .. } => ErrorCategory::Configuration,
            CopilotError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            CopilotError::Network(err) => err.is_retryable(),
            CopilotError::Stream(err) => err.is_retryable(),
            CopilotError::System(_)
            | CopilotError::Preferences(_)
            | CopilotError::Configuration { .. } => false,
            CopilotError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            CopilotError::Network(err) => err.user_message(),
            CopilotError::Stream(err) => err.user_message(),
            CopilotError::System(err) => err.user_message(),
            CopilotError::Preferences(err) => format!("Could not access preferences: {}", err),
            CopilotError::Configuration { message } => format!("Configuration error: {}", message),
            CopilotError::WithContext { error, context } => {
                format!("{} {}", error.user_message(), context)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            CopilotError::Network(err) => err.error_code(),
            CopilotError::Stream(err) => err.error_code(),
            CopilotError::System(err) => err.error_code(),
            CopilotError::Preferences(_) => "E_PREFS",
            CopilotError::Configuration { .. } => "E_CONFIG",
            CopilotError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        CopilotError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            CopilotError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the innermost error without context.
    pub fn inner(&self) -> &CopilotError {
        match self {
            CopilotError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// True when the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self.inner(), CopilotError::Network(NetworkError::NotFound { .. }))
    }
}

impl fmt::Display for CopilotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopilotError::Network(err) => write!(f, "{}", err),
            CopilotError::Stream(err) => write!(f, "{}", err),
            CopilotError::System(err) => write!(f, "{}", err),
            CopilotError::Preferences(err) => write!(f, "{}", err),
            CopilotError::Configuration { message } => write!(f, "Configuration error: {}", message),
            CopilotError::WithContext { error, context } => write!(f, "{} {}", error, context),
        }
    }
}

impl std::error::Error for CopilotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CopilotError::Network(err) => Some(err),
            CopilotError::Stream(err) => Some(err),
            CopilotError::System(err) => Some(err),
            CopilotError::Preferences(err) => Some(err),
            CopilotError::Configuration { .. } => None,
            CopilotError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<NetworkError> for CopilotError {
    fn from(err: NetworkError) -> Self {
        CopilotError::Network(err)
    }
}

impl From<StreamError> for CopilotError {
    fn from(err: StreamError) -> Self {
        CopilotError::Stream(err)
    }
}

impl From<SystemError> for CopilotError {
    fn from(err: SystemError) -> Self {
        CopilotError::System(err)
    }
}

impl From<PreferencesError> for CopilotError {
    fn from(err: PreferencesError) -> Self {
        CopilotError::Preferences(err)
    }
}

impl From<std::io::Error> for CopilotError {
    fn from(err: std::io::Error) -> Self {
        use super::system::classify_io_error;
        CopilotError::System(classify_io_error(err, None, "I/O operation"))
    }
}

impl From<serde_json::Error> for CopilotError {
    fn from(err: serde_json::Error) -> Self {
        CopilotError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_categories() {
        let err: CopilotError = NetworkError::ConnectionFailed {
            url: "http://localhost:8000".to_string(),
            message: "refused".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());

        let err: CopilotError = NetworkError::HttpStatus {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Server);

        let err: CopilotError = NetworkError::NotFound {
            resource: "job j-1".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::User);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stream_categories() {
        let err: CopilotError = StreamError::BackendError {
            code: None,
            message: "agent crashed".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Server);

        let err: CopilotError = StreamError::LineTooLong { limit: 8 }.into();
        assert_eq!(err.category(), ErrorCategory::Client);

        let err: CopilotError = StreamError::Cancelled.into();
        assert_eq!(err.category(), ErrorCategory::User);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_context_wrapping_preserves_properties() {
        let err: CopilotError = NetworkError::NotFound {
            resource: "schedule s-9".to_string(),
        }
        .into();
        let err = err.with_context(
            ErrorContext::new("toggle_schedule").with_resource("schedule s-9"),
        );

        assert_eq!(err.context().map(|c| c.operation.as_str()), Some("toggle_schedule"));
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "E_NET_NOT_FOUND");
        assert!(err.to_string().contains("toggle_schedule"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CopilotError = json_err.into();
        assert!(matches!(
            err,
            CopilotError::Network(NetworkError::InvalidResponse { .. })
        ));
        assert_eq!(err.category(), ErrorCategory::Client);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err: CopilotError = io_err.into();
        assert_eq!(err.category(), ErrorCategory::System);
    }

    #[test]
    fn test_configuration_error() {
        let err = CopilotError::configuration("base URL must start with http");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.error_code(), "E_CONFIG");
        assert!(err.user_message().contains("base URL"));
    }
}
