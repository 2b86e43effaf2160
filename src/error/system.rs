//! System-related error types.
//!
//! Local filesystem failures: preferences file, report output, workspace
//! files read from disk before upload.

use std::fmt;
use std::path::PathBuf;

/// System-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemError {
    /// File not found.
    FileNotFound { path: PathBuf },

    /// Permission denied for file/directory operation.
    PermissionDenied { path: PathBuf, operation: String },

    /// Generic I/O error.
    IoError {
        operation: String,
        path: Option<PathBuf>,
        message: String,
    },

    /// Could not determine home directory.
    NoHomeDirectory,

    /// Generic system error.
    Other { message: String },
}

impl SystemError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SystemError::FileNotFound { path } => {
                format!("File not found: '{}'", path.display())
            }
            SystemError::PermissionDenied { path, operation } => {
                format!("Permission denied: cannot {} '{}'.", operation, path.display())
            }
            SystemError::IoError { operation, path, .. } => match path {
                Some(p) => format!("Failed to {} '{}'", operation, p.display()),
                None => format!("Failed to {}", operation),
            },
            SystemError::NoHomeDirectory => {
                "Could not determine your home directory. Set QA_COPILOT_PREFS instead."
                    .to_string()
            }
            SystemError::Other { message } => format!("System error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SystemError::FileNotFound { .. } => "E_SYS_NOT_FOUND",
            SystemError::PermissionDenied { .. } => "E_SYS_PERM",
            SystemError::IoError { .. } => "E_SYS_IO",
            SystemError::NoHomeDirectory => "E_SYS_HOME",
            SystemError::Other { .. } => "E_SYS_OTHER",
        }
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::FileNotFound { path } => write!(f, "File not found: {}", path.display()),
            SystemError::PermissionDenied { path, operation } => {
                write!(f, "Permission denied ({}): {}", operation, path.display())
            }
            SystemError::IoError {
                operation,
                path,
                message,
            } => match path {
                Some(p) => write!(f, "I/O error during {} on {}: {}", operation, p.display(), message),
                None => write!(f, "I/O error during {}: {}", operation, message),
            },
            SystemError::NoHomeDirectory => write!(f, "Home directory not found"),
            SystemError::Other { message } => write!(f, "System error: {}", message),
        }
    }
}

impl std::error::Error for SystemError {}

/// Classify an I/O error, attaching the path and operation when known.
pub fn classify_io_error(
    err: std::io::Error,
    path: Option<PathBuf>,
    operation: &str,
) -> SystemError {
    use std::io::ErrorKind;

    match (err.kind(), path) {
        (ErrorKind::NotFound, Some(path)) => SystemError::FileNotFound { path },
        (ErrorKind::PermissionDenied, Some(path)) => SystemError::PermissionDenied {
            path,
            operation: operation.to_string(),
        },
        (_, path) => SystemError::IoError {
            operation: operation.to_string(),
            path,
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_classify_not_found_with_path() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let classified = classify_io_error(err, Some(PathBuf::from("/tmp/report.html")), "read");
        assert_eq!(
            classified,
            SystemError::FileNotFound {
                path: PathBuf::from("/tmp/report.html")
            }
        );
    }

    #[test]
    fn test_classify_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let classified = classify_io_error(err, Some(PathBuf::from("/etc/x")), "write");
        assert_eq!(classified.error_code(), "E_SYS_PERM");
        assert!(classified.user_message().contains("write"));
    }

    #[test]
    fn test_classify_without_path_falls_back_to_io_error() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let classified = classify_io_error(err, None, "load preferences");
        assert!(matches!(classified, SystemError::IoError { path: None, .. }));
        assert_eq!(classified.user_message(), "Failed to load preferences");
    }
}
