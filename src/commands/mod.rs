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

pub mod check;
pub mod compare;
pub mod install;
pub mod list;
pub mod run;

use crate::check::{ConfigComponentPolicy, NightlyChecker, UpdateServerChecker};
use crate::component::{NoopHost, StaticRegistry};
use crate::config::{ConfigStore, FileConfigStore, UpkeepConfig};
use crate::download::{DownloadOptions, HttpFileDownloader};
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::update::{InstallContext, UpdateRecord};
use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use std::sync::Arc;

/// A scheduler wired to the configured components, the settings file, both
/// check strategies and the HTTP downloader.
pub(crate) fn build_scheduler(config: &UpkeepConfig) -> Result<Scheduler> {
    let registry = StaticRegistry::from_config(&config.components)?;
    let store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::open(&config.settings_path())?);

    let context = InstallContext {
        downloader: Arc::new(HttpFileDownloader::new(DownloadOptions::from(
            &config.download,
        ))),
        host: Arc::new(NoopHost),
        download_dir: config.download_dir(),
    };

    Ok(
        Scheduler::new(Arc::new(registry), Arc::clone(&store), context)
            .with_policy(Arc::new(ConfigComponentPolicy::new(store)))
            .with_strategy(Arc::new(UpdateServerChecker::new(
                config.server.check_url.as_str(),
            )))
            .with_strategy(Arc::new(NightlyChecker::new(
                config.server.nightly_url.as_str(),
            ))),
    )
}

/// Pending updates as a table: component, installed version, new version, status.
pub(crate) fn updates_table(records: &[UpdateRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Component", "Installed", "Available", "Status"]);

    for record in records {
        let component = record.component();
        table.add_row(vec![
            component.friendly_name(),
            component.friendly_version(),
            record.remote_version().to_string(),
            record.status().to_string(),
        ]);
    }
    table
}
