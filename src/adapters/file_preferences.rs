//! JSON-file preferences store.
//!
//! Preferences live in `~/.qa-copilot/preferences.json` unless another path
//! is configured.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::models::Preferences;
use crate::traits::{PreferencesError, PreferencesStore};

const PREFERENCES_DIR: &str = ".qa-copilot";
const PREFERENCES_FILE: &str = "preferences.json";

/// File-based preferences store.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    /// Store at the default location under the home directory.
    pub fn new() -> Result<Self, PreferencesError> {
        Self::default_path()
            .map(Self::with_path)
            .ok_or_else(|| PreferencesError::Unavailable("home directory not found".to_string()))
    }

    /// Store at an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.qa-copilot/preferences.json`, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(PREFERENCES_DIR).join(PREFERENCES_FILE))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferencesStore for FilePreferences {
    fn load(&self) -> Result<Preferences, PreferencesError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Preferences::default()),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn save(&self, prefs: &Preferences) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Replaced atomically via rename.
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, prefs)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Saved preferences");
        Ok(())
    }
}
