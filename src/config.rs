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

//! Configuration: the static `config.toml` and the persisted key/value store.

use crate::check::UpdateChannel;
use crate::error::{Result, UpkeepError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

pub const DEFAULT_CHECK_URL: &str = "https://updates.upkeep.dev/check";
pub const DEFAULT_NIGHTLY_URL: &str = "https://nightlies.upkeep.dev/json/latest";
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_SIZE_MB: u64 = 1024;

pub const UPDATER_DOMAIN: &str = "updater";
pub const KEY_ENABLE: &str = "enable";
pub const KEY_AUTOUPDATE: &str = "autoupdate";
pub const KEY_AUTODOWNLOAD: &str = "autodownload";
pub const KEY_LASTCHECK: &str = "lastcheck";
pub const KEY_FREQUENCY: &str = "frequency";
pub const KEY_CHANNEL: &str = "channel";
pub const DEFAULT_FREQUENCY_SECS: i64 = 86_400;

/// Key holding the per-component check permission.
pub fn component_enable_key(component: &str) -> String {
    format!("enable-{component}")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpkeepConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub components: Vec<ComponentConfig>,

    #[serde(skip)]
    home: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_check_url")]
    pub check_url: String,

    #[serde(default = "default_nightly_url")]
    pub nightly_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            check_url: default_check_url(),
            nightly_url: default_nightly_url(),
        }
    }
}

fn default_check_url() -> String {
    DEFAULT_CHECK_URL.to_string()
}

fn default_nightly_url() -> String {
    DEFAULT_NIGHTLY_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Overrides `<home>/downloads` for temporary artifacts.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            directory: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_size_mb() -> u64 {
    DEFAULT_MAX_SIZE_MB
}

/// One `[[components]]` entry, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ComponentConfig {
    Client {
        name: String,
        #[serde(default)]
        friendly_name: Option<String>,
        version: String,
        /// The binary the running client is loaded from.
        target: PathBuf,
        #[serde(default)]
        launched_via_launcher: bool,
    },
    Launcher {
        name: String,
        #[serde(default)]
        friendly_name: Option<String>,
        version: String,
        target: PathBuf,
        install_dir: PathBuf,
    },
    Plugin {
        name: String,
        #[serde(default)]
        friendly_name: Option<String>,
        version: String,
        target: PathBuf,
    },
    Bundle {
        name: String,
        #[serde(default)]
        friendly_name: Option<String>,
        version: String,
        bundle: BundleConfigKind,
        target_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleConfigKind {
    DefaultSettings,
    ModeAliases,
    ActionPack,
}

impl UpkeepConfig {
    pub fn load(upkeep_home: &Path) -> Result<Self> {
        let config_path = paths::config_file(upkeep_home);

        if !config_path.exists() {
            log::debug!("Config file not found at {config_path:?}, using defaults");
            return Ok(Self {
                home: upkeep_home.to_path_buf(),
                ..Self::default()
            });
        }

        let contents = fs::read_to_string(&config_path)?;
        let mut config: UpkeepConfig = toml::from_str(&contents)
            .map_err(|e| UpkeepError::ConfigError(format!("Failed to parse config.toml: {e}")))?;
        config.home = upkeep_home.to_path_buf();

        log::debug!("Loaded config from {config_path:?}");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = paths::config_file(&self.home);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| UpkeepError::ConfigError(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, contents)?;
        log::debug!("Saved config to {config_path:?}");
        Ok(())
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Where temporary artifacts are written.
    pub fn download_dir(&self) -> PathBuf {
        self.download
            .directory
            .clone()
            .unwrap_or_else(|| paths::downloads_dir(&self.home))
    }

    pub fn settings_path(&self) -> PathBuf {
        paths::settings_file(&self.home)
    }
}

/// Loads the configuration from the resolved upkeep home.
pub fn new_upkeep_config() -> Result<UpkeepConfig> {
    let home = paths::resolve_upkeep_home()?;
    UpkeepConfig::load(&home)
}

/// Persisted key/value settings, grouped by domain.
pub trait ConfigStore: Send + Sync {
    fn get_option(&self, domain: &str, key: &str) -> Option<String>;

    fn set_option(&self, domain: &str, key: &str, value: &str) -> Result<()>;

    fn get_bool(&self, domain: &str, key: &str, default: bool) -> bool {
        match self.get_option(domain, key) {
            None => default,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    log::warn!("Setting {domain}.{key}={raw} is not a boolean, using {default}");
                    default
                }
            },
        }
    }

    fn get_int(&self, domain: &str, key: &str, default: i64) -> i64 {
        match self.get_option(domain, key) {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Setting {domain}.{key}={raw} is not an integer, using {default}");
                default
            }),
        }
    }
}

type Domains = BTreeMap<String, BTreeMap<String, String>>;

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<Domains>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(self, domain: &str, key: &str, value: &str) -> Self {
        insert(&self.values, domain, key, value);
        self
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_option(&self, domain: &str, key: &str) -> Option<String> {
        lookup(&self.values, domain, key)
    }

    fn set_option(&self, domain: &str, key: &str, value: &str) -> Result<()> {
        insert(&self.values, domain, key, value);
        Ok(())
    }
}

/// TOML-backed store, written through on every `set_option`.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    values: RwLock<Domains>,
}

impl FileConfigStore {
    pub fn open(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents).map_err(|e| {
                UpkeepError::ConfigFile(format!("Failed to parse {}: {e}", path.display()))
            })?
        } else {
            log::debug!("Settings file {path:?} does not exist yet");
            Domains::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &Domains) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(values)
            .map_err(|e| UpkeepError::ConfigFile(format!("Failed to serialize settings: {e}")))?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get_option(&self, domain: &str, key: &str) -> Option<String> {
        lookup(&self.values, domain, key)
    }

    fn set_option(&self, domain: &str, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values
            .entry(domain.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.flush(&values)?;
        log::trace!("Persisted {domain}.{key}={value} to {:?}", self.path);
        Ok(())
    }
}

fn lookup(values: &RwLock<Domains>, domain: &str, key: &str) -> Option<String> {
    values
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(domain)
        .and_then(|entries| entries.get(key))
        .cloned()
}

fn insert(values: &RwLock<Domains>, domain: &str, key: &str, value: &str) {
    values
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(domain.to_string())
        .or_default()
        .insert(key.to_string(), value.to_string());
}

/// Snapshot of the `updater` domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterSettings {
    pub enabled: bool,
    pub auto_update: bool,
    pub auto_download: bool,
    /// Unix seconds of the last completed check cycle.
    pub last_check: i64,
    /// Seconds between check cycles, always positive.
    pub frequency: i64,
    pub channel: UpdateChannel,
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_update: false,
            auto_download: false,
            last_check: 0,
            frequency: DEFAULT_FREQUENCY_SECS,
            channel: UpdateChannel::Stable,
        }
    }
}

impl UpdaterSettings {
    pub fn read(store: &dyn ConfigStore) -> Self {
        let defaults = Self::default();

        let mut frequency = store.get_int(UPDATER_DOMAIN, KEY_FREQUENCY, defaults.frequency);
        if frequency <= 0 {
            log::warn!(
                "Update frequency {frequency}s is not positive, using {DEFAULT_FREQUENCY_SECS}s"
            );
            frequency = DEFAULT_FREQUENCY_SECS;
        }

        let channel = store
            .get_option(UPDATER_DOMAIN, KEY_CHANNEL)
            .map(|raw| UpdateChannel::from_config_value(&raw))
            .unwrap_or(defaults.channel);

        Self {
            enabled: store.get_bool(UPDATER_DOMAIN, KEY_ENABLE, defaults.enabled),
            auto_update: store.get_bool(UPDATER_DOMAIN, KEY_AUTOUPDATE, defaults.auto_update),
            auto_download: store.get_bool(UPDATER_DOMAIN, KEY_AUTODOWNLOAD, defaults.auto_download),
            last_check: store.get_int(UPDATER_DOMAIN, KEY_LASTCHECK, defaults.last_check),
            frequency,
            channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UpkeepConfig::default();
        assert_eq!(config.server.check_url, DEFAULT_CHECK_URL);
        assert_eq!(config.download.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.components.is_empty());
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = UpkeepConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.home(), temp_dir.path());
        assert_eq!(config.download_dir(), temp_dir.path().join("downloads"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();

        let mut config = UpkeepConfig::load(temp_dir.path()).unwrap();
        config.download.timeout_secs = 30;
        config.components.push(ComponentConfig::Plugin {
            name: "plugin-ui".to_string(),
            friendly_name: None,
            version: "1.2".to_string(),
            target: PathBuf::from("/opt/app/plugins/ui.jar"),
        });
        config.save().unwrap();

        let loaded = UpkeepConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.download.timeout_secs, 30);
        assert_eq!(loaded.components, config.components);
    }

    #[test]
    fn test_components_section() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(paths::CONFIG_FILE),
            r#"
[server]
check_url = "http://localhost:9000/check"

[download]
directory = "/var/tmp/upkeep"

[[components]]
kind = "client"
name = "client"
version = "0.5.1"
target = "/opt/app/app.jar"
launched_via_launcher = true

[[components]]
kind = "bundle"
name = "defaultsettings"
version = "3"
bundle = "default-settings"
target_dir = "/opt/app/settings"
"#,
        )
        .unwrap();

        let loaded = UpkeepConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.server.check_url, "http://localhost:9000/check");
        assert_eq!(loaded.server.nightly_url, DEFAULT_NIGHTLY_URL);
        assert_eq!(loaded.download_dir(), PathBuf::from("/var/tmp/upkeep"));
        assert_eq!(loaded.components.len(), 2);
        assert!(matches!(
            &loaded.components[1],
            ComponentConfig::Bundle {
                bundle: BundleConfigKind::DefaultSettings,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(paths::CONFIG_FILE), "[[components]]\nkind = 7").unwrap();
        assert!(matches!(
            UpkeepConfig::load(temp_dir.path()),
            Err(UpkeepError::ConfigError(_))
        ));
    }

    #[test]
    fn test_store_typed_helpers() {
        let store = MemoryConfigStore::new()
            .with_option(UPDATER_DOMAIN, KEY_ENABLE, "false")
            .with_option(UPDATER_DOMAIN, KEY_FREQUENCY, "3600")
            .with_option(UPDATER_DOMAIN, KEY_LASTCHECK, "soon");

        assert!(!store.get_bool(UPDATER_DOMAIN, KEY_ENABLE, true));
        assert!(store.get_bool(UPDATER_DOMAIN, KEY_AUTOUPDATE, true));
        assert_eq!(store.get_int(UPDATER_DOMAIN, KEY_FREQUENCY, 0), 3600);
        assert_eq!(store.get_int(UPDATER_DOMAIN, KEY_LASTCHECK, 42), 42);
    }

    #[test]
    fn test_updater_settings_defaults() {
        let settings = UpdaterSettings::read(&MemoryConfigStore::new());
        assert_eq!(settings, UpdaterSettings::default());
        assert!(settings.enabled);
        assert_eq!(settings.frequency, DEFAULT_FREQUENCY_SECS);
    }

    #[test]
    fn test_updater_settings_rejects_non_positive_frequency() {
        let store = MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_FREQUENCY, "-5");
        assert_eq!(UpdaterSettings::read(&store).frequency, DEFAULT_FREQUENCY_SECS);
    }

    #[test]
    fn test_updater_settings_channel() {
        let store = MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_CHANNEL, "nightly");
        assert_eq!(UpdaterSettings::read(&store).channel, UpdateChannel::Nightly);
    }

    #[test]
    fn test_file_store_writes_through() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");

        let store = FileConfigStore::open(&path).unwrap();
        store.set_option(UPDATER_DOMAIN, KEY_LASTCHECK, "1700000000").unwrap();
        store
            .set_option(UPDATER_DOMAIN, &component_enable_key("client"), "false")
            .unwrap();

        let reopened = FileConfigStore::open(&path).unwrap();
        assert_eq!(reopened.get_int(UPDATER_DOMAIN, KEY_LASTCHECK, 0), 1_700_000_000);
        assert!(!reopened.get_bool(UPDATER_DOMAIN, "enable-client", true));

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[updater]"));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            FileConfigStore::open(&path),
            Err(UpkeepError::ConfigFile(_))
        ));
    }
}
