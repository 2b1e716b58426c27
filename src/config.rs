//! User settings and on-disk locations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::Rgb;

const APP_NAME: &str = "GanttPlanner";

/// Persisted user settings (lives in the OS config directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub autosave_enabled: bool,
    pub autosave_interval_secs: u64,
    /// New tasks end this many days after they start.
    pub default_task_days: i64,
    /// Used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Most recent first.
    pub recent_colors: Vec<Rgb>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_interval_secs: 30,
            default_task_days: 1,
            log_filter: "info".into(),
            recent_colors: Vec::new(),
        }
    }
}

impl AppSettings {
    pub const MAX_RECENT_COLORS: usize = 10;
    pub const MAX_TASK_DAYS: i64 = 3650;

    /// Read settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no settings file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&contents) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| StoreError::io(path, e))
    }

    /// Pull hand-edited values back into range.
    fn sanitized(mut self) -> Self {
        let days = self.default_task_days.clamp(0, Self::MAX_TASK_DAYS);
        if days != self.default_task_days {
            warn!(
                value = self.default_task_days,
                clamped = days,
                "default_task_days out of range"
            );
            self.default_task_days = days;
        }
        self
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }

    /// Move `color` to the front of the recent list.
    pub fn remember_color(&mut self, color: Rgb) {
        self.recent_colors.retain(|c| *c != color);
        self.recent_colors.insert(0, color);
        self.recent_colors.truncate(Self::MAX_RECENT_COLORS);
    }
}

/// Where settings and autosaves live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppDirs {
    /// The platform directories, or the working directory when the platform
    /// has none.
    pub fn resolve() -> Self {
        match directories::ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => Self {
                config_dir: dirs.config_dir().to_path_buf(),
                data_dir: dirs.data_dir().to_path_buf(),
            },
            None => {
                warn!("no home directory found, keeping settings in the working directory");
                Self::rooted_at(".")
            }
        }
    }

    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    pub fn autosave_path(&self) -> PathBuf {
        self.data_dir.join("autosave.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join("nope.json"));
        assert_eq!(settings, AppSettings::default());
        assert!(settings.autosave_enabled);
        assert_eq!(settings.autosave_interval_secs, 30);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"default_task_days": 5}"#).unwrap();
        let settings = AppSettings::load(&path);
        assert_eq!(settings.default_task_days, 5);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn out_of_range_task_days_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"default_task_days": 9223372036854775807}"#).unwrap();
        assert_eq!(AppSettings::load(&path).default_task_days, AppSettings::MAX_TASK_DAYS);
        std::fs::write(&path, r#"{"default_task_days": -4}"#).unwrap();
        assert_eq!(AppSettings::load(&path).default_task_days, 0);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load(&path), AppSettings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = AppDirs::rooted_at(dir.path());
        let mut settings = AppSettings {
            autosave_enabled: false,
            ..AppSettings::default()
        };
        settings.remember_color(Rgb::new(1, 2, 3));
        settings.save(&dirs.settings_path()).unwrap();
        assert_eq!(AppSettings::load(&dirs.settings_path()), settings);
    }

    #[test]
    fn recent_colors_are_unique_and_bounded() {
        let mut settings = AppSettings::default();
        for i in 0..15u8 {
            settings.remember_color(Rgb::new(i, i, i));
        }
        settings.remember_color(Rgb::new(10, 10, 10));
        assert_eq!(settings.recent_colors.len(), AppSettings::MAX_RECENT_COLORS);
        assert_eq!(settings.recent_colors[0], Rgb::new(10, 10, 10));
        assert_eq!(
            settings
                .recent_colors
                .iter()
                .filter(|c| **c == Rgb::new(10, 10, 10))
                .count(),
            1
        );
    }
}
