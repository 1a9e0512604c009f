use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use viewer_core::{ValidationRules, VALIDATION_DEBOUNCE};
use viewer_engine::{EngineConfig, FetchSettings};

use super::logging::LogDestination;

/// Looked up in the working directory at startup.
pub const CONFIG_FILENAME: &str = "viewer.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Every field is optional in `viewer.ron`; missing ones take the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub output_dir: PathBuf,
    pub prefs_path: PathBuf,
    pub log_destination: LogDestination,
    pub debounce_ms: u64,
    pub reachability_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub check_host_pattern: bool,
    pub check_reachability: bool,
    /// Initial OS dark-mode signal. The console host has no OS query.
    pub system_dark: bool,
    /// Hand new-tab documents to the system browser.
    pub open_in_browser: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            output_dir: PathBuf::from("downloads"),
            prefs_path: PathBuf::from("prefs.ron"),
            log_destination: LogDestination::File,
            debounce_ms: VALIDATION_DEBOUNCE.as_millis() as u64,
            reachability_timeout_ms: fetch.reachability_timeout.as_millis() as u64,
            probe_timeout_ms: fetch.probe_timeout.as_millis() as u64,
            check_host_pattern: false,
            check_reachability: false,
            system_dark: false,
            open_in_browser: true,
        }
    }
}

impl ViewerConfig {
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            check_host_pattern: self.check_host_pattern,
            check_reachability: self.check_reachability,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default_with_output(self.output_dir.clone());
        config.fetch.reachability_timeout = Duration::from_millis(self.reachability_timeout_ms);
        config.fetch.probe_timeout = Duration::from_millis(self.probe_timeout_ms);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ViewerConfig::load(&temp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.validation_rules(), ValidationRules::default());
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            "(check_reachability: true, debounce_ms: 250, log_destination: Both)",
        )
        .unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert!(config.check_reachability);
        assert!(!config.check_host_pattern);
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.prefs_path, PathBuf::from("prefs.ron"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(debounce_ms: \"soon\")").unwrap();
        assert!(matches!(
            ViewerConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn engine_config_carries_timeouts() {
        let config = ViewerConfig {
            reachability_timeout_ms: 1200,
            probe_timeout_ms: 3400,
            ..ViewerConfig::default()
        };
        let engine = config.engine_config();
        assert_eq!(engine.fetch.reachability_timeout, Duration::from_millis(1200));
        assert_eq!(engine.fetch.probe_timeout, Duration::from_millis(3400));
        assert_eq!(engine.output_dir, PathBuf::from("downloads"));
    }
}
