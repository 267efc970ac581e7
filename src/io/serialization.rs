// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings serialization and deserialization.
//!
//! This module handles exporting and importing settings in YAML and JSON
//! formats, and locating the settings file used at startup.

use crate::models::settings::Settings;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file to load at startup.
pub const CONFIG_ENV: &str = "VIDBOX_CONFIG";
/// Settings file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "vidbox.yaml";

/// Export settings to YAML format.
pub fn export_yaml(data: &Settings, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export settings to JSON format.
pub fn export_json(data: &Settings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import settings from YAML format.
pub fn import_yaml(path: &Path) -> Result<Settings> {
    let yaml = std::fs::read_to_string(path)?;
    let data: Settings = serde_yaml::from_str(&yaml)?;
    Ok(data.sanitized())
}

/// Import settings from JSON format.
pub fn import_json(path: &Path) -> Result<Settings> {
    let json = std::fs::read_to_string(path)?;
    let data: Settings = serde_json::from_str(&json)?;
    Ok(data.sanitized())
}

/// Import settings, picking the format from the file extension.
pub fn import_settings(path: &Path) -> Result<Settings> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported settings file extension: {:?}", other),
    }
}

/// Export settings, picking the format from the file extension.
pub fn export_settings(data: &Settings, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        other => bail!("Unsupported settings file extension: {:?}", other),
    }
}

/// Settings file to load at startup, if any.
pub fn startup_settings_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        }
    }
}

/// Load startup settings, falling back to defaults when the file is unusable.
pub fn load_startup_settings() -> Settings {
    let Some(path) = startup_settings_path() else {
        return Settings::default();
    };
    match import_settings(&path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("Ignoring settings file {}: {}", path.display(), e);
            Settings::default()
        }
    }
}
