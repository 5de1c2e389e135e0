use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::settings::{default_settings_dir, StoreScope};

pub const APP_DIR_NAME: &str = "target-arrow-overlay";

/// Launch options for the overlay process. Display settings the user tunes in
/// the panel live in the settings store instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ws_bind: String,
    pub store_scope: StoreScope,
    pub settings_dir: Option<PathBuf>,
    pub poll_ms: u64,
    pub always_on_top: bool,
    pub mouse_passthrough: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_bind: "127.0.0.1:38472".to_owned(),
            store_scope: StoreScope::Character,
            settings_dir: None,
            poll_ms: 100,
            always_on_top: true,
            mouse_passthrough: false,
        }
    }
}

impl AppConfig {
    pub fn load_or_create() -> Result<(Self, PathBuf)> {
        let config_dir = dirs::config_dir()
            .context("unable to locate OS config directory")?
            .join(APP_DIR_NAME);
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("failed creating config dir at {}", config_dir.display()))?;

        let config_path = config_dir.join("config.json");
        let config = Self::load_or_create_at(&config_path)?;
        Ok((config, config_path))
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default = Self::default();
            default.save(path)?;
            return Ok(default);
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        serde_json::from_str::<Self>(&text)
            .with_context(|| format!("invalid json in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self).context("failed serializing config")?;
        fs::write(path, payload).with_context(|| format!("failed writing {}", path.display()))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.clamp(16, 1_000))
    }

    pub fn resolved_settings_dir(&self) -> Result<PathBuf> {
        match &self.settings_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_settings_dir().context("unable to locate OS config directory"),
        }
    }
}
