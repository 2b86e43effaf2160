//! Persisted operator preferences.
//!
//! Preferences (selected workspaces, last conversation) are reached through
//! an injected [`PreferencesStore`] instead of ambient global state, so the
//! selection logic can be tested against an in-memory store.

use thiserror::Error;

use crate::models::Preferences;

/// Preferences store errors.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// Reading or writing the backing file failed.
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("preferences are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No location to store preferences could be determined.
    #[error("no preferences location available: {0}")]
    Unavailable(String),
}

/// Load/save access to persisted preferences.
///
/// A store that has never been written to loads [`Preferences::default`].
pub trait PreferencesStore: Send + Sync {
    /// Load the current preferences.
    fn load(&self) -> Result<Preferences, PreferencesError>;

    /// Replace the stored preferences.
    fn save(&self, prefs: &Preferences) -> Result<(), PreferencesError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_error_display() {
        let err = PreferencesError::Unavailable("no home directory".to_string());
        assert_eq!(
            err.to_string(),
            "no preferences location available: no home directory"
        );
    }

    #[test]
    fn test_preferences_error_from_json() {
        let json_err = serde_json::from_str::<Preferences>("not json").unwrap_err();
        let err: PreferencesError = json_err.into();
        assert!(matches!(err, PreferencesError::Serialization(_)));
    }
}
