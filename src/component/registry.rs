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

use crate::component::{BundleKind, Component, ComponentKind};
use crate::config::{BundleConfigKind, ComponentConfig};
use crate::error::{Result, UpkeepError};
use crate::version::Version;
use std::collections::HashSet;
use std::sync::Arc;

/// Supplies the components known to the application.
pub trait ComponentRegistry: Send + Sync {
    fn components(&self) -> Vec<Arc<Component>>;

    fn find(&self, name: &str) -> Option<Arc<Component>> {
        self.components()
            .into_iter()
            .find(|component| component.name() == name)
    }
}

/// A fixed list of components, typically built from `config.toml`.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    components: Vec<Arc<Component>>,
}

impl StaticRegistry {
    pub fn new(components: Vec<Component>) -> Result<Self> {
        let mut seen = HashSet::new();
        for component in &components {
            if !seen.insert(component.name().to_string()) {
                return Err(UpkeepError::ConfigError(format!(
                    "Component '{}' is registered more than once",
                    component.name()
                )));
            }
        }

        Ok(Self {
            components: components.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_config(entries: &[ComponentConfig]) -> Result<Self> {
        Self::new(entries.iter().map(component_from_config).collect())
    }
}

impl ComponentRegistry for StaticRegistry {
    fn components(&self) -> Vec<Arc<Component>> {
        self.components.clone()
    }
}

fn component_from_config(entry: &ComponentConfig) -> Component {
    let (name, friendly_name, version, kind) = match entry {
        ComponentConfig::Client {
            name,
            friendly_name,
            version,
            target,
            launched_via_launcher,
        } => (
            name,
            friendly_name,
            version,
            ComponentKind::ClientBinary {
                target: target.clone(),
                launched_via_launcher: *launched_via_launcher,
            },
        ),
        ComponentConfig::Launcher {
            name,
            friendly_name,
            version,
            target,
            install_dir,
        } => (
            name,
            friendly_name,
            version,
            ComponentKind::LauncherBinary {
                target: target.clone(),
                install_dir: install_dir.clone(),
            },
        ),
        ComponentConfig::Plugin {
            name,
            friendly_name,
            version,
            target,
        } => (
            name,
            friendly_name,
            version,
            ComponentKind::Plugin {
                target: target.clone(),
            },
        ),
        ComponentConfig::Bundle {
            name,
            friendly_name,
            version,
            bundle,
            target_dir,
        } => (
            name,
            friendly_name,
            version,
            ComponentKind::ResourceBundle {
                bundle: match bundle {
                    BundleConfigKind::DefaultSettings => BundleKind::DefaultSettings,
                    BundleConfigKind::ModeAliases => BundleKind::ModeAliases,
                    BundleConfigKind::ActionPack => BundleKind::ActionPack,
                },
                target_dir: target_dir.clone(),
            },
        ),
    };

    let parsed = Version::new(version);
    if !parsed.is_valid() {
        log::warn!("Component {name} has unparseable version '{version}', treating as unknown");
    }

    let component = Component::new(name.clone(), parsed, kind);
    match friendly_name {
        Some(friendly) => component.with_friendly_name(friendly.clone()),
        None => component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn plugin_entry(name: &str, version: &str) -> ComponentConfig {
        ComponentConfig::Plugin {
            name: name.to_string(),
            friendly_name: None,
            version: version.to_string(),
            target: PathBuf::from(format!("plugins/{name}.jar")),
        }
    }

    #[test]
    fn test_from_config() {
        let registry = StaticRegistry::from_config(&[
            ComponentConfig::Client {
                name: "client".to_string(),
                friendly_name: Some("My Client".to_string()),
                version: "0.5.1".to_string(),
                target: PathBuf::from(".client.jar"),
                launched_via_launcher: false,
            },
            plugin_entry("ui", "12"),
        ])
        .unwrap();

        let components = registry.components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].friendly_name(), "My Client");
        assert!(components[0].requires_manual_install());
        assert_eq!(components[1].version().to_string(), "12");
    }

    #[test]
    fn test_find() {
        let registry = StaticRegistry::from_config(&[plugin_entry("ui", "1")]).unwrap();
        assert!(registry.find("ui").is_some());
        assert!(registry.find("dcc").is_none());
    }

    #[test]
    fn test_invalid_version_becomes_unknown() {
        let registry = StaticRegistry::from_config(&[plugin_entry("ui", "latest")]).unwrap();
        let component = registry.find("ui").unwrap();
        assert!(!component.version().is_valid());
        assert_eq!(component.friendly_version(), "unknown");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = StaticRegistry::from_config(&[plugin_entry("ui", "1"), plugin_entry("ui", "2")]);
        assert!(matches!(result, Err(UpkeepError::ConfigError(_))));
    }
}
