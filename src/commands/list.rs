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

use crate::check::{ComponentPolicy, ConfigComponentPolicy};
use crate::component::{Component, ComponentRegistry, StaticRegistry};
use crate::config::{FileConfigStore, UpkeepConfig};
use crate::error::Result;
use crate::paths;
use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use std::sync::Arc;

pub struct ListCommand<'a> {
    config: &'a UpkeepConfig,
}

impl<'a> ListCommand<'a> {
    pub fn new(config: &'a UpkeepConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<()> {
        let registry = StaticRegistry::from_config(&self.config.components)?;
        let components = registry.components();

        if components.is_empty() {
            println!("No components configured");
            println!(
                "Add [[components]] entries to {}",
                paths::config_file(self.config.home()).display()
            );
            return Ok(());
        }

        let policy = ConfigComponentPolicy::new(Arc::new(FileConfigStore::open(
            &self.config.settings_path(),
        )?));
        println!("{}", components_table(&components, &policy));
        Ok(())
    }
}

fn components_table(components: &[Arc<Component>], policy: &dyn ComponentPolicy) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Component", "Version", "Kind", "Checks", "Install"]);

    for component in components {
        let install = if component.requires_manual_install() {
            "manual"
        } else if component.requires_restart() {
            "restart"
        } else {
            "live"
        };
        let checks = if policy.can_check(component.name()) {
            "enabled"
        } else {
            "disabled"
        };

        table.add_row(vec![
            component.name().to_string(),
            component.friendly_name(),
            component.friendly_version(),
            component.kind().label().to_string(),
            checks.to_string(),
            install.to_string(),
        ]);
    }
    table
}
