use crate::settings::PetSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "screen_pets_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

/// Missing file loads as defaults.
pub fn load_or_default(settings_path: &Path) -> Result<PetSettings> {
    Ok(load_from_path(settings_path)?.unwrap_or_default())
}

pub fn load_from_path(settings_path: &Path) -> Result<Option<PetSettings>> {
    if !settings_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(settings_path)
        .with_context(|| format!("read settings file {}", settings_path.display()))?;

    if content.trim().is_empty() {
        return Ok(Some(PetSettings::default()));
    }

    let mut loaded: PetSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize settings file {}", settings_path.display()))?;
    loaded.sanitize();
    Ok(Some(loaded))
}

pub fn save_to_path(settings_path: &Path, settings: &PetSettings) -> Result<()> {
    if let Some(parent) = settings_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create settings parent folder {}", parent.display()))?;
    }

    let sanitized = settings.clone().sanitized();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize settings")?;
    std::fs::write(settings_path, json)
        .with_context(|| format!("write settings file {}", settings_path.display()))
}
