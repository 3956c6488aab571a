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

use crate::commands::build_scheduler;
use crate::config::UpkeepConfig;
use crate::error::{Result, UpkeepError};
use crate::indicator::{ProgressConfig, ProgressIndicator, ProgressStyle, StatusReporter};
use crate::scheduler::{CheckOutcome, Scheduler};
use crate::update::{InstallJob, Subscription, UpdateListener, UpdateRecord, UpdateStatus};
use log::debug;
use std::sync::{Arc, Mutex, PoisonError};

pub struct InstallCommand {
    scheduler: Scheduler,
    status: StatusReporter,
}

impl InstallCommand {
    pub fn new(config: &UpkeepConfig, no_progress: bool) -> Result<Self> {
        Ok(Self {
            scheduler: build_scheduler(config)?,
            status: StatusReporter::new(no_progress),
        })
    }

    pub fn execute(&self, names: &[String], all: bool) -> Result<()> {
        if names.is_empty() && !all {
            return Err(UpkeepError::ValidationError(
                "Name the components to update, or pass --all".to_string(),
            ));
        }

        let settings = self.scheduler.settings();
        debug!("Installing updates on channel {}", settings.channel);

        self.status.operation("Checking", "for updates");
        let records = match self.scheduler.check_now()? {
            CheckOutcome::Completed { records, errors } => {
                for error in &errors {
                    self.status.warning(&error.to_string());
                }
                records
            }
            CheckOutcome::Disabled => {
                self.status
                    .warning("Update checking is disabled, nothing to install");
                return Ok(());
            }
            CheckOutcome::AlreadyRunning => {
                return Err(UpkeepError::SystemError(
                    "Another update check is running".to_string(),
                ));
            }
        };

        let selected = select(records, names, all)?;
        if selected.is_empty() {
            self.status.success("All components are up to date");
            return Ok(());
        }

        let mut started = Vec::new();
        for record in selected {
            let listener = self.progress_listener(&record);
            let subscription = record.subscribe(listener);
            match record.start_install() {
                Ok(job) => started.push((job, subscription)),
                Err(e) => self.status.warning(&format!(
                    "Skipping {}: {e}",
                    record.component().friendly_name()
                )),
            }
        }

        self.report(started)
    }

    fn progress_listener(&self, record: &UpdateRecord) -> Arc<ProgressListener> {
        let handle = self.status.progress_handle();
        let indicator = handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .create_child();
        Arc::new(ProgressListener::new(
            indicator,
            format!(
                "{} {}",
                record.component().friendly_name(),
                record.remote_version()
            ),
        ))
    }

    fn report(&self, started: Vec<(InstallJob, Subscription)>) -> Result<()> {
        let mut first_failure = None;
        let mut installed = 0;

        for (job, subscription) in started {
            let record = job.record().clone();
            let status = job.wait();
            subscription.unsubscribe();

            let name = record.component().friendly_name();
            match status {
                UpdateStatus::Installed => installed += 1,
                UpdateStatus::RestartNeeded => {
                    installed += 1;
                    self.status
                        .warning(&format!("Restart to finish updating {name}"));
                }
                UpdateStatus::ManualRequired => {
                    if let Some(instructions) = record.manual_instructions() {
                        self.status.warning(&instructions);
                    }
                }
                _ => {
                    let reason = record
                        .error_message()
                        .unwrap_or_else(|| format!("finished as {status}"));
                    if first_failure.is_none() {
                        first_failure = Some(UpkeepError::Install {
                            component: record.component().name().to_string(),
                            reason,
                        });
                    }
                }
            }
        }

        if installed > 0 {
            self.status.success(&format!(
                "{installed} update{} installed",
                if installed == 1 { "" } else { "s" }
            ));
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Picks the records to install. Naming a component that has no update is
/// not an error unless none of the named components has one.
fn select(records: Vec<UpdateRecord>, names: &[String], all: bool) -> Result<Vec<UpdateRecord>> {
    if all {
        return Ok(records);
    }

    let selected: Vec<UpdateRecord> = records
        .into_iter()
        .filter(|record| names.iter().any(|name| name == record.component().name()))
        .collect();

    if selected.is_empty() {
        return Err(UpkeepError::NoPendingUpdate(names.join(", ")));
    }
    Ok(selected)
}

/// Drives one progress indicator from one record's notifications.
struct ProgressListener {
    indicator: Mutex<Box<dyn ProgressIndicator>>,
    context: String,
}

impl ProgressListener {
    fn new(indicator: Box<dyn ProgressIndicator>, context: String) -> Self {
        Self {
            indicator: Mutex::new(indicator),
            context,
        }
    }
}

impl UpdateListener for ProgressListener {
    fn status_changed(&self, record: &UpdateRecord, status: UpdateStatus) {
        let mut indicator = self
            .indicator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match status {
            UpdateStatus::Downloading => indicator.start(
                ProgressConfig::new("Downloading", self.context.clone(), ProgressStyle::Percent)
                    .with_total(100),
            ),
            UpdateStatus::Installing => {
                indicator.update(100, None);
                indicator.set_message("installing".to_string());
            }
            UpdateStatus::Installed => indicator.complete(Some("installed".to_string())),
            UpdateStatus::RestartNeeded => {
                indicator.complete(Some("installed, restart needed".to_string()))
            }
            UpdateStatus::ManualRequired => {
                indicator.complete(Some("manual install required".to_string()))
            }
            UpdateStatus::Error => indicator.error(
                record
                    .error_message()
                    .unwrap_or_else(|| "update failed".to_string()),
            ),
            UpdateStatus::Pending | UpdateStatus::Downloaded => {}
        }
    }

    fn progress_changed(&self, _record: &UpdateRecord, progress: f32) {
        let percent = (progress * 100.0).round() as u64;
        self.indicator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(percent, None);
    }
}
