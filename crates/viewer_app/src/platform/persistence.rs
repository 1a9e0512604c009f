use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use viewer_core::{ThemePreference, THEME_KEY};
use viewer_engine::AtomicFileWriter;
use viewer_logging::{viewer_error, viewer_info, viewer_warn};

/// On-disk shape of the preference file. The field name is the storage key.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedPrefs {
    #[serde(default)]
    theme: String,
}

/// Theme preference stored in a RON file, written atomically.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Missing, unreadable or unrecognized values fall back to `System`.
    pub fn load(&self) -> ThemePreference {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return ThemePreference::default();
            }
            Err(err) => {
                viewer_warn!("Failed to read preferences from {:?}: {}", self.path, err);
                return ThemePreference::default();
            }
        };

        let prefs: PersistedPrefs = match ron::from_str(&content) {
            Ok(prefs) => prefs,
            Err(err) => {
                viewer_warn!("Failed to parse preferences from {:?}: {}", self.path, err);
                return ThemePreference::default();
            }
        };

        if prefs.theme.is_empty() {
            return ThemePreference::default();
        }
        match prefs.theme.parse::<ThemePreference>() {
            Ok(preference) => {
                viewer_info!("Loaded {} preference {} from {:?}", THEME_KEY, preference, self.path);
                preference
            }
            Err(err) => {
                viewer_warn!("Ignoring stored {}: {}", THEME_KEY, err);
                ThemePreference::default()
            }
        }
    }

    /// Failures are logged; the app keeps running on in-memory state.
    pub fn save(&self, preference: ThemePreference) {
        let Some(filename) = self.path.file_name().and_then(|name| name.to_str()) else {
            viewer_error!("Preference path {:?} has no file name", self.path);
            return;
        };

        let prefs = PersistedPrefs {
            theme: preference.as_str().to_string(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&prefs, pretty) {
            Ok(text) => text,
            Err(err) => {
                viewer_error!("Failed to serialize preferences: {}", err);
                return;
            }
        };

        let writer = AtomicFileWriter::new(parent_dir(&self.path));
        if let Err(err) = writer.write(filename, &content) {
            viewer_error!("Failed to write preferences to {:?}: {}", self.path, err);
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> ThemeStore {
        ThemeStore::new(temp.path().join("prefs.ron"))
    }

    #[test]
    fn missing_file_defaults_to_system() {
        let temp = TempDir::new().unwrap();
        assert_eq!(store(&temp).load(), ThemePreference::System);
    }

    #[test]
    fn saved_preference_is_loaded_back() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.save(ThemePreference::Dark);
        assert_eq!(store.load(), ThemePreference::Dark);

        store.save(ThemePreference::Light);
        assert_eq!(store.load(), ThemePreference::Light);

        let raw = fs::read_to_string(temp.path().join("prefs.ron")).unwrap();
        assert!(raw.contains("theme"));
        assert!(raw.contains("\"light\""));
    }

    #[test]
    fn garbage_file_defaults_to_system() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("prefs.ron"), "not ron at all {").unwrap();
        assert_eq!(store(&temp).load(), ThemePreference::System);
    }

    #[test]
    fn unknown_value_defaults_to_system() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("prefs.ron"), "(theme: \"sepia\")").unwrap();
        assert_eq!(store(&temp).load(), ThemePreference::System);
    }

    #[test]
    fn save_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let store = ThemeStore::new(temp.path().join("nested").join("prefs.ron"));
        store.save(ThemePreference::Dark);
        assert_eq!(store.load(), ThemePreference::Dark);
    }

    #[test]
    fn relative_path_writes_next_to_cwd() {
        assert_eq!(parent_dir(Path::new("prefs.ron")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/prefs.ron")), PathBuf::from("a"));
    }
}
