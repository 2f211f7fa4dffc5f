//! Persisted viewer settings.
//!
//! Settings are a flat JSON document. Unknown keys are ignored and missing
//! keys take their default, so files written by older builds still load.

use log::warn;
use serde::{Deserialize, Serialize};
use sketch_core::{
    config::{BranchConfig, DivideConfig},
    divided::ShapeMode,
    types::{Color, WHITE},
};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "generative-sketches";
const FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which sketch the viewer shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SketchKind {
    Divided(ShapeMode),
    Tree,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub kind: SketchKind,
    pub divide: DivideConfig,
    pub branch: BranchConfig,
    /// Seconds between automatic ticks.
    pub tick_interval: f64,
    pub seed: u64,
    pub background: Color,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kind: SketchKind::Divided(ShapeMode::Rectangles),
            divide: DivideConfig::default(),
            branch: BranchConfig::default(),
            tick_interval: 0.1,
            seed: 42,
            background: WHITE,
        }
    }
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// No path or a missing file gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, PrefsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };

        let settings: Self = serde_json::from_str(&text)?;
        Ok(settings.sanitized())
    }

    /// Writes settings to `path` through a temporary file, creating parent
    /// directories as needed.
    pub fn save(&self, path: Option<&Path>) -> Result<(), PrefsError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Replaces invalid sections with their defaults.
    pub fn sanitized(mut self) -> Self {
        if let Err(err) = self.divide.validate() {
            warn!("divide settings rejected ({err}), using defaults");
            self.divide = DivideConfig::default();
        }
        if let Err(err) = self.branch.validate() {
            warn!("branch settings rejected ({err}), using defaults");
            self.branch = BranchConfig::default();
        }
        if !(self.tick_interval > 0.0) {
            self.tick_interval = Self::default().tick_interval;
        }
        self
    }
}

/// `$XDG_CONFIG_HOME/generative-sketches/settings.json`, falling back to
/// `~/.config/...`.
pub fn settings_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.trim().is_empty()
    {
        return Some(PathBuf::from(xdg).join(APP_DIR).join(FILE_NAME));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(FILE_NAME),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("{APP_DIR}-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn no_path_or_missing_file_gives_defaults() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());

        let path = scratch_file("missing/settings.json");
        assert_eq!(Settings::load(Some(&path)).unwrap(), Settings::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let path = scratch_file("roundtrip/settings.json");
        let mut settings = Settings::default();
        settings.kind = SketchKind::Tree;
        settings.seed = 7;
        settings.branch.divisions = 9;
        settings.divide.pick_largest_chance = 0.5;

        settings.save(Some(&path)).unwrap();
        let loaded = Settings::load(Some(&path)).unwrap();

        assert_eq!(loaded, settings);
        assert!(!path.with_extension("tmp").exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let loaded: Settings =
            serde_json::from_str(r#"{ "seed": 5, "divide": { "initial_stroke": 3.0 } }"#).unwrap();

        assert_eq!(loaded.seed, 5);
        assert_eq!(loaded.divide.initial_stroke, 3.0);
        assert_eq!(loaded.divide.fractions, DivideConfig::default().fractions);
        assert_eq!(loaded.branch, BranchConfig::default());
    }

    #[test]
    fn invalid_sections_are_replaced() {
        let path = scratch_file("invalid/settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{ "seed": 3, "divide": { "fractions": [] }, "tick_interval": -1.0 }"#,
        )
        .unwrap();

        let loaded = Settings::load(Some(&path)).unwrap();

        assert_eq!(loaded.seed, 3);
        assert_eq!(loaded.divide, DivideConfig::default());
        assert_eq!(loaded.tick_interval, 0.1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let path = scratch_file("broken/settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Settings::load(Some(&path)),
            Err(PrefsError::Json(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
