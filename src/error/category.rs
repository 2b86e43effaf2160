//! Error category classification.
//!
//! Categories give callers one coarse switch for deciding whether to retry,
//! what to tell the operator, and whether the problem is on our side.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout. Generally transient.
    Network,

    /// Backend rejected or failed the request (5xx, `error` stream events).
    Server,

    /// The client could not make sense of what it received.
    Client,

    /// Something the operator has to fix (bad id, cancelled request, 4xx).
    User,

    /// Filesystem and OS errors.
    System,

    /// Missing or invalid configuration.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label suitable for structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Operator-facing description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Server => "Copilot backend issue",
            ErrorCategory::Client => "Unexpected data from the backend",
            ErrorCategory::User => "Action required",
            ErrorCategory::System => "Local system error",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// Suggested next step for the operator.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the Copilot backend is reachable and try again",
            ErrorCategory::Server => "The backend may be busy or failing. Try again later",
            ErrorCategory::Client => "The client and backend may be out of date with each other",
            ErrorCategory::User => "Check the ids and arguments you passed and try again",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Configuration => {
                "Check QA_COPILOT_URL and the other QA_COPILOT_* settings"
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
