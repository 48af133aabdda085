use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use client_core::{
    timezones::{is_known_timezone, DEFAULT_TIMEZONE},
    DEFAULT_API_BASE_URL,
};
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub default_timezone: String,
    pub preferences_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 10,
            default_timezone: DEFAULT_TIMEZONE.into(),
            preferences_path: default_preferences_path(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    default_timezone: Option<String>,
    preferences_path: Option<PathBuf>,
}

pub fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .map(|base| base.join("event_dashboard"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("preferences.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file at `path` if it parses, then the environment.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = v;
                }
                if let Some(v) = file_cfg.default_timezone {
                    settings.default_timezone = v;
                }
                if let Some(v) = file_cfg.preferences_path {
                    settings.preferences_path = v;
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            }
        }
    }

    if let Some(v) = env("EVENT_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__DEFAULT_TIMEZONE") {
        settings.default_timezone = v;
    }
    if !is_known_timezone(&settings.default_timezone) {
        warn!(
            timezone = %settings.default_timezone,
            "configured default timezone is not supported, using {DEFAULT_TIMEZONE}"
        );
        settings.default_timezone = DEFAULT_TIMEZONE.into();
    }

    if let Some(v) = env("APP__PREFERENCES_PATH") {
        settings.preferences_path = PathBuf::from(v);
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
