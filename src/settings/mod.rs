//! Persistence of the user-tunable arrow display settings.
//!
//! Two backends share one [`SettingsStore`] seam: a single key-value file
//! shared by every character, and one JSON file per sanitized character name.

mod character;
mod identity;
mod shared;

use std::{
    fs,
    path::{Path, PathBuf},
};

use eframe::egui::{pos2, Pos2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::APP_DIR_NAME;

pub use character::CharacterFileStore;
pub use shared::SharedFileStore;

pub const MIN_ARROW_SCALE: f32 = 1.0;
pub const MAX_ARROW_SCALE: f32 = 10.0;

/// Coordinate value meaning "let the host place the window".
pub const UNSET_POSITION: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayConfig {
    pub arrow_scale: f32,
    pub arrow_color: [f32; 4],
    pub window_x: f32,
    pub window_y: f32,
    pub window_w: f32,
    pub window_h: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            arrow_scale: 4.0,
            arrow_color: [1.0, 1.0, 0.4, 1.0],
            window_x: UNSET_POSITION,
            window_y: UNSET_POSITION,
            window_w: 160.0,
            window_h: 220.0,
        }
    }
}

impl DisplayConfig {
    /// Scale multiplier limited to the slider range. The stored value is left
    /// untouched so hand-edited files survive a round trip.
    pub fn clamped_scale(&self) -> f32 {
        clamp_scale(self.arrow_scale)
    }

    pub fn saved_position(&self) -> Option<Pos2> {
        (self.window_x >= 0.0 && self.window_y >= 0.0).then(|| pos2(self.window_x, self.window_y))
    }

    pub fn saved_size(&self) -> [f32; 2] {
        [self.window_w, self.window_h]
    }
}

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return MIN_ARROW_SCALE;
    }
    scale.clamp(MIN_ARROW_SCALE, MAX_ARROW_SCALE)
}

/// Which characters share a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreScope {
    Shared,
    #[default]
    Character,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable record of [`DisplayConfig`] keyed by scope.
///
/// `load` never fails: anything it cannot read falls back to the defaults,
/// one field at a time.
pub trait SettingsStore {
    fn path_for(&self, identity: Option<&str>) -> PathBuf;

    fn load(&self, identity: Option<&str>) -> DisplayConfig;

    fn save(&self, config: &DisplayConfig, identity: Option<&str>) -> StoreResult<()>;

    fn scope(&self) -> StoreScope;
}

pub fn open_store(scope: StoreScope, dir: PathBuf) -> Box<dyn SettingsStore> {
    match scope {
        StoreScope::Shared => Box::new(SharedFileStore::new(dir)),
        StoreScope::Character => Box::new(CharacterFileStore::new(dir)),
    }
}

pub fn default_settings_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Writes `payload` next to `path` and renames it into place, so a crash
/// mid-write leaves either the old file or the new one.
fn write_atomic(path: &Path, payload: &[u8]) -> StoreResult<()> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| StoreError::Io { path, source }
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, payload).map_err(io_err(temp_path.as_path()))?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: err,
        });
    }

    tracing::debug!(path = %path.display(), "saved display settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        clamp_scale, open_store, write_atomic, DisplayConfig, StoreError, StoreScope,
        MAX_ARROW_SCALE, MIN_ARROW_SCALE,
    };
    use eframe::egui::pos2;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = DisplayConfig::default();
        assert_eq!(config.arrow_scale, 4.0);
        assert_eq!(config.arrow_color, [1.0, 1.0, 0.4, 1.0]);
        assert_eq!(config.window_x, -1.0);
        assert_eq!(config.window_y, -1.0);
        assert_eq!(config.window_w, 160.0);
        assert_eq!(config.window_h, 220.0);
        assert_eq!(config.saved_position(), None);
    }

    #[test]
    fn clamp_keeps_in_range_values_and_limits_the_rest() {
        for value in [1.0_f32, 1.5, 4.0, 7.25, 10.0] {
            assert_eq!(clamp_scale(value), value);
        }
        for value in [-100.0_f32, 0.0, 0.99, 10.01, 55.0, f32::INFINITY, f32::NAN] {
            let clamped = clamp_scale(value);
            assert!((MIN_ARROW_SCALE..=MAX_ARROW_SCALE).contains(&clamped), "{value} -> {clamped}");
        }
    }

    #[test]
    fn clamped_scale_does_not_touch_stored_value() {
        let config = DisplayConfig {
            arrow_scale: 42.0,
            ..DisplayConfig::default()
        };
        assert_eq!(config.clamped_scale(), 10.0);
        assert_eq!(config.arrow_scale, 42.0);
    }

    #[test]
    fn saved_position_requires_both_coordinates() {
        let mut config = DisplayConfig::default();
        config.window_x = 30.0;
        assert_eq!(config.saved_position(), None);
        config.window_y = 0.0;
        assert_eq!(config.saved_position(), Some(pos2(30.0, 0.0)));
        config.window_x = -1.0;
        assert_eq!(config.saved_position(), None);
    }

    #[test]
    fn scope_parses_from_snake_case() {
        let shared: StoreScope = serde_json::from_str("\"shared\"").expect("shared scope");
        let character: StoreScope = serde_json::from_str("\"character\"").expect("character scope");
        assert_eq!(shared, StoreScope::Shared);
        assert_eq!(character, StoreScope::Character);
        assert_eq!(StoreScope::default(), StoreScope::Character);
    }

    #[test]
    fn open_store_selects_backend_by_scope() {
        let dir = TempDir::new().expect("temp dir");
        let shared = open_store(StoreScope::Shared, dir.path().to_path_buf());
        let character = open_store(StoreScope::Character, dir.path().to_path_buf());
        assert_eq!(shared.scope(), StoreScope::Shared);
        assert_eq!(character.scope(), StoreScope::Character);
        assert_ne!(shared.path_for(Some("Ayla")), character.path_for(Some("Ayla")));
    }

    #[test]
    fn atomic_write_replaces_target_and_leaves_no_temp_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("settings.ini");
        write_atomic(&path, b"first").expect("first write");
        write_atomic(&path, b"second").expect("second write");

        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "second");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().expect("parent"))
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn atomic_write_reports_rename_failure() {
        let dir = TempDir::new().expect("temp dir");
        // A directory at the target path makes the rename fail.
        let path = dir.path().join("occupied");
        std::fs::create_dir_all(path.join("child")).expect("occupy target");

        let err = write_atomic(&path, b"payload").expect_err("rename onto a directory");
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!dir.path().join("occupied.tmp").exists());
    }
}
