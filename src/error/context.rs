//! Error context for enriched error information.

use chrono::{DateTime, Utc};

/// Context attached to errors for debugging: which operation failed, on
/// which resource, under which correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Resource the operation targeted, e.g. `job j-42` or `workspace PRD`.
    pub resource: Option<String>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Optional component/module where the error originated.
    pub component: Option<String>,

    /// Correlation ID sent to the backend with the failing request.
    pub correlation_id: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            timestamp: Utc::now(),
            component: None,
            correlation_id: None,
        }
    }

    /// Set the targeted resource.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the component for this context.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set the correlation ID for this context.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Formatted `key=value` string for log lines.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref resource) = self.resource {
            parts.push(format!("resource={}", resource));
        }
        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }
        if let Some(ref correlation_id) = self.correlation_id {
            parts.push(format!("correlation_id={}", correlation_id));
        }
        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref resource) = self.resource {
            write!(f, " {}", resource)?;
        }
        if let Some(ref correlation_id) = self.correlation_id {
            write!(f, " correlation={}", correlation_id)?;
        }

        Ok(())
    }
}
