use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::AppError;

pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "VIDEO_DL_CONFIG";

/// Light/dark appearance of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Dark,
    Light,
    System,
}

/// Persisted user settings, stored as `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub default_output_folder: String,
    pub theme: Appearance,
    pub color_theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_output_folder: default_output_folder().to_string_lossy().to_string(),
            theme: Appearance::Dark,
            color_theme: "dark-blue".to_string(),
        }
    }
}

fn default_output_folder() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Videos")
        .join("YouTube")
}

/// Location of the config file, honouring `VIDEO_DL_CONFIG`.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
}

/// Owned handle to the settings and the file backing them.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Loads settings from `path`.
    ///
    /// A missing or unparsable file is replaced with the defaults. Failing to
    /// write the defaults back is logged and the defaults are still used.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let settings = match read_settings(&path) {
            Ok(settings) => settings,
            Err(reason) => {
                warn!(
                    "Config file not found or corrupted ({}), creating default config.",
                    reason
                );
                let defaults = Settings::default();
                if let Err(e) = write_settings(&path, &defaults) {
                    warn!("Failed to write default config to {}: {}", path.display(), e);
                }
                defaults
            }
        };

        Self { path, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn output_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.default_output_folder)
    }

    /// Updates the output folder and persists the change.
    ///
    /// The in-memory settings only change once the file has been written.
    pub fn set_output_folder(&mut self, folder: &Path) -> Result<(), AppError> {
        let mut updated = self.settings.clone();
        updated.default_output_folder = folder.to_string_lossy().to_string();
        write_settings(&self.path, &updated)?;
        self.settings = updated;
        info!("Output folder set to: {}", self.settings.default_output_folder);
        Ok(())
    }
}

fn read_settings(path: &Path) -> Result<Settings, String> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => "not found".to_string(),
        _ => e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {}", e))
}

/// Pretty-prints `settings` with 4-space indentation.
pub fn to_pretty_json(settings: &Settings) -> Result<String, AppError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    settings
        .serialize(&mut serializer)
        .map_err(|e| AppError::Config(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| AppError::Config(e.to_string()))
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), AppError> {
    let json = to_pretty_json(settings)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::Io(e.to_string()))?;
    }
    fs::write(path, json).map_err(|e| AppError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = SettingsStore::load(&path);
        let defaults = Settings::default();
        assert_eq!(store.settings(), &defaults);

        let on_disk = fs::read_to_string(&path).unwrap();
        let expected = format!(
            "{{\n    \"default_output_folder\": {},\n    \"theme\": \"dark\",\n    \"color_theme\": \"dark-blue\"\n}}",
            serde_json::to_string(&defaults.default_output_folder).unwrap()
        );
        assert_eq!(on_disk, expected);
    }

    #[test]
    fn test_default_output_folder_is_under_videos() {
        let defaults = Settings::default();
        let folder = PathBuf::from(&defaults.default_output_folder);
        assert!(folder.ends_with(Path::new("Videos").join("YouTube")));
    }

    #[test]
    fn test_corrupt_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::load(&path);
        assert_eq!(store.settings(), &Settings::default());

        let reloaded: Settings =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded, Settings::default());
    }

    #[test]
    fn test_invalid_theme_counts_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme": "purple"}"#).unwrap();

        let store = SettingsStore::load(&path);
        assert_eq!(store.settings().theme, Appearance::Dark);
    }

    #[test]
    fn test_existing_file_is_loaded_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let content = r#"{"default_output_folder": "/data/videos", "theme": "light", "color_theme": "green"}"#;
        fs::write(&path, content).unwrap();

        let store = SettingsStore::load(&path);
        assert_eq!(store.output_folder(), PathBuf::from("/data/videos"));
        assert_eq!(store.settings().theme, Appearance::Light);
        assert_eq!(store.settings().color_theme, "green");
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme": "system"}"#).unwrap();

        let store = SettingsStore::load(&path);
        assert_eq!(store.settings().theme, Appearance::System);
        assert_eq!(store.settings().color_theme, "dark-blue");
    }

    #[test]
    fn test_set_output_folder_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = SettingsStore::load(&path);

        store.set_output_folder(Path::new("/srv/media")).unwrap();

        let reloaded = SettingsStore::load(&path);
        assert_eq!(reloaded.output_folder(), PathBuf::from("/srv/media"));
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("    \"default_output_folder\": \"/srv/media\""));
    }

    #[test]
    fn test_failed_save_keeps_previous_folder() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("file");
        fs::write(&not_a_dir, b"x").unwrap();

        let mut store = SettingsStore::load(not_a_dir.join("config.json"));
        let before = store.output_folder();

        let result = store.set_output_folder(Path::new("/new/folder"));

        assert!(matches!(result, Err(AppError::Io(_))));
        assert_eq!(store.output_folder(), before);
        assert_eq!(store.settings(), &Settings::default());
    }
}
