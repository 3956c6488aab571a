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

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway `UPKEEP_HOME`, removed on drop.
pub struct TestHomeGuard {
    dir: TempDir,
}

impl TestHomeGuard {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create test home directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn upkeep_home(&self) -> PathBuf {
        self.path().join(".upkeep")
    }

    /// Directory for installed component files.
    pub fn install_dir(&self) -> PathBuf {
        let dir = self.path().join("install");
        fs::create_dir_all(&dir).expect("Failed to create install directory");
        dir
    }

    pub fn write_config(&self, contents: &str) -> &Self {
        self.write(upkeep::paths::CONFIG_FILE, contents)
    }

    pub fn write_settings(&self, contents: &str) -> &Self {
        self.write(upkeep::paths::SETTINGS_FILE, contents)
    }

    pub fn read_settings(&self) -> String {
        fs::read_to_string(self.upkeep_home().join(upkeep::paths::SETTINGS_FILE))
            .unwrap_or_default()
    }

    fn write(&self, name: &str, contents: &str) -> &Self {
        let home = self.upkeep_home();
        fs::create_dir_all(&home).expect("Failed to create .upkeep directory");
        fs::write(home.join(name), contents).expect("Failed to write test file");
        self
    }

    /// The `upkeep` binary pointed at this home.
    pub fn command(&self) -> Command {
        let mut command = Command::cargo_bin("upkeep").expect("upkeep binary is built");
        command
            .env(upkeep::paths::UPKEEP_HOME_ENV, self.upkeep_home())
            .env("UPKEEP_NO_TTY_PROGRESS", "1")
            .env_remove("RUST_LOG");
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_and_cleans_up_directory() {
        let test_path = {
            let guard = TestHomeGuard::new();
            guard.write_settings("[updater]\nenable = \"false\"\n");
            assert!(guard.upkeep_home().join("settings.toml").exists());
            guard.path().to_path_buf()
        };
        assert!(!test_path.exists());
    }
}
