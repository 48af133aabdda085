use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::timezones::is_known_timezone;

pub const TIMEZONE_KEY: &str = "selectedTimezone";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("could not prepare preferences directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write preferences file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage for the viewer's timezone choice, read once at startup and written
/// on every change.
pub trait TimezonePreference: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, timezone: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(rename = "selectedTimezone", default, skip_serializing_if = "Option::is_none")]
    selected_timezone: Option<String>,
}

/// JSON file holding `{"selectedTimezone": "..."}`.
#[derive(Debug, Clone)]
pub struct FileTimezonePreference {
    path: PathBuf,
}

impl FileTimezonePreference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> PreferencesFile {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return PreferencesFile::default()
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not read preferences");
                return PreferencesFile::default();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "ignoring unreadable preferences");
            PreferencesFile::default()
        })
    }
}

impl TimezonePreference for FileTimezonePreference {
    fn load(&self) -> Option<String> {
        self.read_file().selected_timezone
    }

    fn save(&self, timezone: &str) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PreferenceError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut file = self.read_file();
        file.selected_timezone = Some(timezone.to_string());
        let bytes = serde_json::to_vec_pretty(&file)?;
        std::fs::write(&self.path, bytes).map_err(|source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), timezone, "saved timezone preference");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTimezonePreference {
    value: Mutex<Option<String>>,
}

impl MemoryTimezonePreference {
    pub fn with_value(timezone: &str) -> Self {
        Self {
            value: Mutex::new(Some(timezone.to_string())),
        }
    }
}

impl TimezonePreference for MemoryTimezonePreference {
    fn load(&self) -> Option<String> {
        self.value.lock().ok().and_then(|value| value.clone())
    }

    fn save(&self, timezone: &str) -> Result<(), PreferenceError> {
        if let Ok(mut value) = self.value.lock() {
            *value = Some(timezone.to_string());
        }
        Ok(())
    }
}

/// The stored timezone if it is one the selectors offer, otherwise `fallback`.
pub fn startup_timezone(preference: &dyn TimezonePreference, fallback: &str) -> String {
    match preference.load() {
        Some(stored) if is_known_timezone(&stored) => stored,
        Some(stored) => {
            warn!(stored, fallback, "stored timezone is not offered, using fallback");
            fallback.to_string()
        }
        None => fallback.to_string(),
    }
}
