use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::settings::GameSettings;

pub fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("journey_west_artifacts");
    path.push("settings.json");
    path
}

pub fn read_settings(path: &Path) -> anyhow::Result<GameSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_settings(path: &Path, settings: &GameSettings) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Missing file means first run; anything else unreadable is logged and
/// replaced by defaults.
pub fn load_settings() -> GameSettings {
    let path = settings_path();
    if !path.exists() {
        return GameSettings::default();
    }

    read_settings(&path).unwrap_or_else(|err| {
        tracing::warn!("falling back to default settings: {err:#}");
        GameSettings::default()
    })
}

pub fn save_settings(settings: &GameSettings) {
    if let Err(err) = write_settings(&settings_path(), settings) {
        tracing::warn!("could not save settings: {err:#}");
    }
}
