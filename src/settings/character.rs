use std::{fs, path::PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{
    identity::sanitize_identity, write_atomic, DisplayConfig, SettingsStore, StoreError,
    StoreResult, StoreScope,
};

pub const SCHEMA_VERSION: u32 = 1;

/// One JSON file per sanitized character name.
pub struct CharacterFileStore {
    dir: PathBuf,
}

impl CharacterFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[derive(Debug, Serialize)]
struct PersistedArrowSettings {
    schema: u32,
    arrow_scale: f32,
    arrow_color: [f32; 4],
    window_x: f32,
    window_y: f32,
    window_w: f32,
    window_h: f32,
}

impl From<&DisplayConfig> for PersistedArrowSettings {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            schema: SCHEMA_VERSION,
            arrow_scale: config.arrow_scale,
            arrow_color: config.arrow_color,
            window_x: config.window_x,
            window_y: config.window_y,
            window_w: config.window_w,
            window_h: config.window_h,
        }
    }
}

impl SettingsStore for CharacterFileStore {
    fn path_for(&self, identity: Option<&str>) -> PathBuf {
        self.dir
            .join(format!("arrow_overlay_{}.json", sanitize_identity(identity)))
    }

    fn load(&self, identity: Option<&str>) -> DisplayConfig {
        let path = self.path_for(identity);
        let mut config = DisplayConfig::default();
        if !path.exists() {
            info!(path = %path.display(), "no saved arrow settings for character, using defaults");
            return config;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(?err, path = %path.display(), "failed reading character arrow settings");
                return config;
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(data) if data.is_object() => apply_fields(&mut config, &data),
            Ok(_) => {
                warn!(path = %path.display(), "character arrow settings are not a json object")
            }
            Err(err) => {
                warn!(?err, path = %path.display(), "invalid character arrow settings json")
            }
        }
        config
    }

    fn save(&self, config: &DisplayConfig, identity: Option<&str>) -> StoreResult<()> {
        let payload = serde_json::to_string_pretty(&PersistedArrowSettings::from(config))
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        write_atomic(&self.path_for(identity), payload.as_bytes())
    }

    fn scope(&self) -> StoreScope {
        StoreScope::Character
    }
}

fn f32_from(data: &Value, name: &str) -> Option<f32> {
    data.get(name)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
}

fn apply_fields(config: &mut DisplayConfig, data: &Value) {
    if let Some(schema) = data.get("schema").and_then(Value::as_u64) {
        if schema > u64::from(SCHEMA_VERSION) {
            warn!(
                schema,
                supported = SCHEMA_VERSION,
                "newer arrow settings schema, reading known fields"
            );
        }
    }

    if let Some(scale) = f32_from(data, "arrow_scale") {
        config.arrow_scale = scale;
    }
    if let Some(channels) = data.get("arrow_color").and_then(Value::as_array) {
        for (slot, channel) in config.arrow_color.iter_mut().zip(channels) {
            if let Some(value) = channel.as_f64().map(|v| v as f32).filter(|v| v.is_finite()) {
                *slot = value;
            }
        }
    }
    if let Some(x) = f32_from(data, "window_x") {
        config.window_x = x;
    }
    if let Some(y) = f32_from(data, "window_y") {
        config.window_y = y;
    }
    if let Some(w) = f32_from(data, "window_w") {
        config.window_w = w;
    }
    if let Some(h) = f32_from(data, "window_h") {
        config.window_h = h;
    }
}
