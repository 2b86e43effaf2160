//! In-memory preferences store for testing.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::Preferences;
use crate::traits::{PreferencesError, PreferencesStore};

/// In-memory preferences store.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPreferences {
    prefs: Arc<Mutex<Preferences>>,
    save_count: Arc<Mutex<usize>>,
    fail_saves: Arc<Mutex<bool>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryPreferences {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial preferences.
    pub fn with_preferences(prefs: Preferences) -> Self {
        let store = Self::default();
        *lock(&store.prefs) = prefs;
        store
    }

    /// Current stored value.
    pub fn snapshot(&self) -> Preferences {
        lock(&self.prefs).clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *lock(&self.save_count)
    }

    /// Make subsequent saves fail.
    pub fn set_fail_saves(&self, fail: bool) {
        *lock(&self.fail_saves) = fail;
    }
}

impl PreferencesStore for InMemoryPreferences {
    fn load(&self) -> Result<Preferences, PreferencesError> {
        Ok(self.snapshot())
    }

    fn save(&self, prefs: &Preferences) -> Result<(), PreferencesError> {
        if *lock(&self.fail_saves) {
            return Err(PreferencesError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "save disabled",
            )));
        }
        *lock(&self.prefs) = prefs.clone();
        *lock(&self.save_count) += 1;
        Ok(())
    }
}
