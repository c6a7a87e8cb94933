// CodeRecoder is a per-project snapshot and restore engine.
// Copyright (C) 2025  CodeRecoder contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! `.CodeRecoder/config/{project.json, settings.json}` loading
//! (SPEC_FULL.md §10.3), defaulted field-by-field the same way the
//! project index tolerates a missing `fileBaselines`/`lastScanTime`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::global::defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_full_save_interval")]
    pub full_save_interval: u64,
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,
    #[serde(default = "default_auto_cleanup")]
    pub auto_cleanup: bool,
    #[serde(default = "default_exclude_basenames")]
    pub exclude_basenames: Vec<String>,
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,
}

fn default_full_save_interval() -> u64 {
    defaults::DEFAULT_FULL_SAVE_INTERVAL
}
fn default_retention_cap() -> usize {
    defaults::DEFAULT_RETENTION_CAP
}
fn default_auto_cleanup() -> bool {
    true
}
fn default_exclude_basenames() -> Vec<String> {
    defaults::DEFAULT_EXCLUDE_BASENAMES
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_exclude_globs() -> Vec<String> {
    defaults::DEFAULT_EXCLUDE_GLOBS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            full_save_interval: default_full_save_interval(),
            retention_cap: default_retention_cap(),
            auto_cleanup: default_auto_cleanup(),
            exclude_basenames: default_exclude_basenames(),
            exclude_globs: default_exclude_globs(),
        }
    }
}

/// Load `project.json`, or `None` if it doesn't exist yet (not an error:
/// the same "start fresh" tolerance the project index applies on a missing
/// file).
pub fn load_project_config(config_dir: &Path) -> Result<Option<ProjectConfig>> {
    let path = config_dir.join("project.json");
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = fs::read(&path)?;
    Ok(serde_json::from_slice(&bytes).ok())
}

pub fn save_project_config(config_dir: &Path, config: &ProjectConfig) -> Result<()> {
    fs::create_dir_all(config_dir)?;
    let bytes = serde_json::to_vec_pretty(config).map_err(std::io::Error::other)?;
    fs::write(config_dir.join("project.json"), bytes)?;
    Ok(())
}

pub fn load_settings(config_dir: &Path) -> Result<StoreSettings> {
    let path = config_dir.join("settings.json");
    if !path.is_file() {
        return Ok(StoreSettings::default());
    }
    let bytes = fs::read(&path)?;
    Ok(serde_json::from_slice(&bytes).unwrap_or_default())
}

pub fn save_settings(config_dir: &Path, settings: &StoreSettings) -> Result<()> {
    fs::create_dir_all(config_dir)?;
    let bytes = serde_json::to_vec_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(config_dir.join("settings.json"), bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_files_default_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_project_config(dir.path()).unwrap().is_none());
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.full_save_interval, defaults::DEFAULT_FULL_SAVE_INTERVAL);
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = StoreSettings::default();
        settings.full_save_interval = 5;
        save_settings(dir.path(), &settings).unwrap();

        let loaded = load_settings(dir.path()).unwrap();
        assert_eq!(loaded.full_save_interval, 5);
    }

    #[test]
    fn partial_settings_json_defaults_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("settings.json"), b"{\"full_save_interval\": 7}").unwrap();

        let loaded = load_settings(dir.path()).unwrap();
        assert_eq!(loaded.full_save_interval, 7);
        assert_eq!(loaded.retention_cap, defaults::DEFAULT_RETENTION_CAP);
    }
}
