//! Result type alias for Copilot operations.

use super::context::ErrorContext;
use super::copilot_error::CopilotError;

/// Type alias for Results using CopilotError.
pub type CopilotResult<T> = Result<T, CopilotError>;

/// Extension trait for attaching [`ErrorContext`] to failing results.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> CopilotResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> CopilotResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<CopilotError>,
{
    fn context(self, ctx: ErrorContext) -> CopilotResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> CopilotResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
