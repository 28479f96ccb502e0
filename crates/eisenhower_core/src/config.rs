//! Application configuration passed explicitly into core components.
//!
//! # Invariants
//! - No process-wide mutable settings; callers hand `AppConfig` (or the
//!   derived `ClassifierConfig`) to the components that need it.
//! - Missing fields in a settings document fall back to defaults.

use crate::classify::{ClassifierConfig, TaskClassifier, DEFAULT_DUE_SOON_DAYS};
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "Eisenhower3x3";
pub const DB_FILE_NAME: &str = "tasks.sqlite3";
pub const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root for the database file and logs.
    pub data_dir: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Look-ahead window for the due-soon state, in days.
    pub due_soon_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level().to_string(),
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

impl AppConfig {
    /// Parses a JSON settings document; absent keys keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            due_soon_days: self.due_soon_days,
        }
    }

    pub fn classifier(&self) -> TaskClassifier {
        TaskClassifier::new(self.classifier_config())
    }
}

/// Platform data directory joined with [`APP_DIR_NAME`].
///
/// Falls back to the home directory, then to the working directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn partial_settings_keep_defaults() {
        let config = AppConfig::from_json_str(r#"{ "due_soon_days": 7 }"#).unwrap();
        assert_eq!(config.due_soon_days, 7);
        assert_eq!(config.classifier().config().due_soon_days, 7);
        assert_eq!(config.log_level, AppConfig::default().log_level);
    }

    #[test]
    fn db_path_lives_under_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/matrix"),
            ..AppConfig::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/matrix").join(DB_FILE_NAME));
    }
}
