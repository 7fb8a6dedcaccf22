//! Tracker configuration.
//!
//! # Responsibility
//! - Load user settings from `config.json`, falling back to defaults.
//! - Resolve where the record file, history and logs live.
//!
//! # Invariants
//! - A missing file yields defaults; a malformed file is an error.
//! - Missing keys take their per-field default.
//! - `TASKTRACK_HOME` wins over `data_dir`.

use crate::db::DB_FILE_NAME;
use crate::scoring::DEFAULT_WORKING_HOURS_PER_DAY;
use crate::service::SortKey;
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_NAME: &str = "tasktrack";
const CONFIG_FILE: &str = "config.json";
const LOG_DIR_NAME: &str = "logs";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TASKTRACK_CONFIG";
/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "TASKTRACK_HOME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the {0} directory")]
    NoDirectory(&'static str),
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Directory holding the record file and its history.
    pub data_dir: Option<PathBuf>,
    /// Hours of work available per calendar day, used by project urgency.
    pub working_hours_per_day: f64,
    /// Mirror every mutation into a git history.
    pub git_commit: bool,
    /// Overrides the build-mode default log level.
    pub log_level: Option<String>,
    pub default_sort: SortKey,
    pub default_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            working_hours_per_day: DEFAULT_WORKING_HOURS_PER_DAY,
            git_commit: true,
            log_level: None,
            default_sort: SortKey::Urgency,
            default_limit: 20,
        }
    }
}

impl TrackerConfig {
    /// Loads from `TASKTRACK_CONFIG` or the user config directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    /// Loads from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.working_hours_per_day.is_finite() || self.working_hours_per_day <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "working_hours_per_day must be positive, got {}",
                self.working_hours_per_day
            )));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid(
                "default_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Data directory honoring `TASKTRACK_HOME`.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        self.resolve_data_dir_with(std::env::var_os(HOME_ENV).map(PathBuf::from))
    }

    /// Data directory given an explicit home override.
    pub fn resolve_data_dir_with(&self, home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        if let Some(home) = home.filter(|path| !path.as_os_str().is_empty()) {
            return Ok(home);
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(ConfigError::NoDirectory("data"))
    }
}

/// Record file inside a data directory.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

/// Log directory inside a data directory.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_DIR_NAME)
}

/// Config file location honoring `TASKTRACK_CONFIG`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let mut path = config_dir().ok_or(ConfigError::NoDirectory("config"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{database_path, ConfigError, TrackerConfig};
    use crate::service::SortKey;
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.working_hours_per_day, 4.0);
        assert!(config.git_commit);
    }

    #[test]
    fn missing_keys_take_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_sort": "importance", "git_commit": false }"#).unwrap();

        let config = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(config.default_sort, SortKey::Importance);
        assert!(!config.git_commit);
        assert_eq!(config.default_limit, 20);
    }

    #[test]
    fn malformed_or_invalid_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TrackerConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));

        std::fs::write(&path, r#"{ "working_hours_per_day": 0 }"#).unwrap();
        assert!(matches!(
            TrackerConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = TrackerConfig {
            data_dir: Some(PathBuf::from("/srv/tasks")),
            working_hours_per_day: 6.0,
            ..TrackerConfig::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(TrackerConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn home_override_beats_configured_data_dir() {
        let config = TrackerConfig {
            data_dir: Some(PathBuf::from("/srv/tasks")),
            ..TrackerConfig::default()
        };
        assert_eq!(
            config
                .resolve_data_dir_with(Some(PathBuf::from("/tmp/override")))
                .unwrap(),
            PathBuf::from("/tmp/override")
        );
        assert_eq!(
            config.resolve_data_dir_with(None).unwrap(),
            PathBuf::from("/srv/tasks")
        );
        assert_eq!(
            database_path(&PathBuf::from("/srv/tasks")),
            PathBuf::from("/srv/tasks/tasktrack.sqlite3")
        );
    }
}
