// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{Result, UpkeepError};
use crate::paths::shared::ensure_child_directory;
use std::path::{Path, PathBuf};

pub const UPKEEP_HOME_ENV: &str = "UPKEEP_HOME";
pub const UPKEEP_DIR_NAME: &str = ".upkeep";
pub const CONFIG_FILE: &str = "config.toml";
pub const SETTINGS_FILE: &str = "settings.toml";
pub const DOWNLOADS_DIR: &str = "downloads";

/// Resolves the home directory: `UPKEEP_HOME` when set to an absolute path,
/// otherwise `~/.upkeep`.
pub fn resolve_upkeep_home() -> Result<PathBuf> {
    if let Ok(value) = std::env::var(UPKEEP_HOME_ENV) {
        let path = PathBuf::from(&value);
        if path.is_absolute() {
            return Ok(path);
        }
        log::warn!("Ignoring {UPKEEP_HOME_ENV}={value}: not an absolute path");
    }

    dirs::home_dir()
        .map(|home| home.join(UPKEEP_DIR_NAME))
        .ok_or_else(|| UpkeepError::ConfigError("Unable to determine home directory".to_string()))
}

pub fn config_file(upkeep_home: &Path) -> PathBuf {
    upkeep_home.join(CONFIG_FILE)
}

pub fn settings_file(upkeep_home: &Path) -> PathBuf {
    upkeep_home.join(SETTINGS_FILE)
}

pub fn downloads_dir(upkeep_home: &Path) -> PathBuf {
    upkeep_home.join(DOWNLOADS_DIR)
}

pub fn ensure_downloads_dir(upkeep_home: &Path) -> Result<PathBuf> {
    ensure_child_directory(upkeep_home, DOWNLOADS_DIR)
}
