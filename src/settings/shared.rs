use std::{fs, path::PathBuf};

use tracing::warn;

use super::{write_atomic, DisplayConfig, SettingsStore, StoreResult, StoreScope};

const FILE_NAME: &str = "arrow_overlay.ini";
const SECTION: &str = "target_arrow";

/// One `key = value` file shared by every character.
pub struct SharedFileStore {
    dir: PathBuf,
}

impl SharedFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl SettingsStore for SharedFileStore {
    fn path_for(&self, _identity: Option<&str>) -> PathBuf {
        self.dir.join(FILE_NAME)
    }

    fn load(&self, identity: Option<&str>) -> DisplayConfig {
        let path = self.path_for(identity);
        let mut config = DisplayConfig::default();
        if !path.exists() {
            return config;
        }
        match fs::read_to_string(&path) {
            Ok(text) => apply_entries(&mut config, &text),
            Err(err) => warn!(?err, path = %path.display(), "failed reading shared arrow settings"),
        }
        config
    }

    fn save(&self, config: &DisplayConfig, identity: Option<&str>) -> StoreResult<()> {
        write_atomic(&self.path_for(identity), render(config).as_bytes())
    }

    fn scope(&self) -> StoreScope {
        StoreScope::Shared
    }
}

fn render(config: &DisplayConfig) -> String {
    let [r, g, b, a] = config.arrow_color;
    let mut out = format!("[{SECTION}]\n");
    out.push_str(&format!("arrow_scale = {:.2}\n", config.arrow_scale));
    out.push_str(&format!("color_r = {r:.2}\n"));
    out.push_str(&format!("color_g = {g:.2}\n"));
    out.push_str(&format!("color_b = {b:.2}\n"));
    out.push_str(&format!("color_a = {a:.2}\n"));
    out.push_str(&format!("window_x = {}\n", config.window_x.round() as i64));
    out.push_str(&format!("window_y = {}\n", config.window_y.round() as i64));
    out.push_str(&format!("window_w = {}\n", config.window_w.round() as i64));
    out.push_str(&format!("window_h = {}\n", config.window_h.round() as i64));
    out
}

/// Applies every recognised entry of our section; anything malformed keeps the
/// value already in `config`.
fn apply_entries(config: &mut DisplayConfig, text: &str) {
    let mut in_section = true;
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            in_section = name.trim().eq_ignore_ascii_case(SECTION);
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        let Ok(value) = value.parse::<f32>() else {
            warn!(key = key.trim(), value, "ignoring malformed arrow setting");
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        match key.trim() {
            "arrow_scale" => config.arrow_scale = value,
            "color_r" => config.arrow_color[0] = value,
            "color_g" => config.arrow_color[1] = value,
            "color_b" => config.arrow_color[2] = value,
            "color_a" => config.arrow_color[3] = value,
            "window_x" => config.window_x = value,
            "window_y" => config.window_y = value,
            "window_w" => config.window_w = value,
            "window_h" => config.window_h = value,
            _ => {}
        }
    }
}
