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

//! Periodic update checks.
//!
//! [`Scheduler::check_now`] runs one check cycle. At most one cycle runs at a
//! time; a caller that loses the race gets [`CheckOutcome::AlreadyRunning`]
//! back without any side effect. [`Scheduler::spawn`] drives cycles from a
//! background thread, re-arming after each one from `updater.lastcheck` and
//! `updater.frequency`.

mod clock;
mod delay;
mod runner;
mod shutdown;

pub use clock::{Clock, ManualClock, SystemClock};
pub use delay::{MIN_CHECK_DELAY, NextCheck, compute_next_delay};
pub use runner::SchedulerHandle;
pub use shutdown::{ShutdownToken, signal_token};

use crate::check::{AllowAll, CheckResult, CheckStrategy, ComponentPolicy, UpdateChannel, consolidate};
use crate::component::{Component, ComponentRegistry};
use crate::config::{ConfigStore, KEY_LASTCHECK, UPDATER_DOMAIN, UpdaterSettings};
use crate::error::{Result, UpkeepError};
use crate::update::{InstallContext, InstallJob, UpdateRecord, UpdateStatus};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

/// What a call to [`Scheduler::check_now`] did.
#[derive(Debug)]
pub enum CheckOutcome {
    /// Another cycle held the check lock; nothing was done.
    AlreadyRunning,
    /// Checking is disabled. Only `lastcheck` was written.
    Disabled,
    /// The remote check ran. `records` are the pending records for the
    /// updates found in this cycle.
    Completed {
        records: Vec<UpdateRecord>,
        errors: Vec<UpkeepError>,
    },
}

pub struct Scheduler {
    registry: Arc<dyn ComponentRegistry>,
    strategies: Vec<Arc<dyn CheckStrategy>>,
    policy: Arc<dyn ComponentPolicy>,
    store: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    context: InstallContext,
    check_lock: Mutex<()>,
    pending: Mutex<BTreeMap<String, UpdateRecord>>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<dyn ComponentRegistry>,
        store: Arc<dyn ConfigStore>,
        context: InstallContext,
    ) -> Self {
        Self {
            registry,
            strategies: Vec::new(),
            policy: Arc::new(AllowAll),
            store,
            clock: Arc::new(SystemClock),
            context,
            check_lock: Mutex::new(()),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn CheckStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn ComponentPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> UpdaterSettings {
        UpdaterSettings::read(self.store.as_ref())
    }

    /// Run one check cycle unless one is already running.
    ///
    /// Returns an error only when `lastcheck` could not be persisted;
    /// strategy failures are reported in [`CheckOutcome::Completed`].
    pub fn check_now(&self) -> Result<CheckOutcome> {
        let guard = match self.check_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                debug!("Update check already in progress, skipping");
                return Ok(CheckOutcome::AlreadyRunning);
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let settings = self.settings();
        if !settings.enabled {
            info!("Update checking is disabled");
            drop(guard);
            self.record_check_time()?;
            return Ok(CheckOutcome::Disabled);
        }

        let (records, errors) = self.run_strategies(settings.channel);
        drop(guard);
        self.record_check_time()?;

        info!(
            "Update check finished: {} update(s) available, {} problem(s)",
            records.len(),
            errors.len()
        );
        Ok(CheckOutcome::Completed { records, errors })
    }

    fn run_strategies(&self, channel: UpdateChannel) -> (Vec<UpdateRecord>, Vec<UpkeepError>) {
        let components: Vec<Arc<Component>> = self
            .registry
            .components()
            .into_iter()
            .filter(|component| {
                let allowed = self.policy.can_check(component.name());
                if !allowed {
                    debug!("Update checks disabled for {}", component.name());
                }
                allowed
            })
            .collect();

        let mut results: Vec<CheckResult> = Vec::new();
        let mut up_to_date: Vec<String> = Vec::new();
        let mut errors = Vec::new();

        if components.is_empty() {
            debug!("No components to check");
            return (Vec::new(), errors);
        }

        for strategy in &self.strategies {
            debug!(
                "Checking {} component(s) via {} on channel {channel}",
                components.len(),
                strategy.name()
            );
            match strategy.check_for_updates(&components, channel) {
                Ok(report) => {
                    for error in &report.errors {
                        warn!("{}: {error}", strategy.name());
                    }
                    results.extend(report.results);
                    up_to_date.extend(report.up_to_date);
                    errors.extend(report.errors);
                }
                Err(error) => {
                    warn!("Update check via {} failed: {error}", strategy.name());
                    errors.push(error);
                }
            }
        }

        let records: Vec<UpdateRecord> = consolidate(results)
            .into_iter()
            .map(|result| self.offer(result))
            .collect();

        for name in up_to_date {
            if !records.iter().any(|record| record.component().name() == name) {
                self.retire(&name);
            }
        }
        (records, errors)
    }

    /// Drop the record of a component a source now reports as current.
    fn retire(&self, name: &str) {
        let mut pending = lock(&self.pending);
        let Some(existing) = pending.get(name) else {
            return;
        };
        let status = existing.status();
        if status.is_in_progress() {
            debug!("{name} is up to date, keeping {status} update");
            return;
        }
        debug!(
            "{name} is up to date, dropping {status} update to {}",
            existing.remote_version()
        );
        if let Some(record) = pending.remove(name) {
            record.discard_artifact();
        }
    }

    /// Put a check result into the pending set and return the record that
    /// now represents it.
    fn offer(&self, result: CheckResult) -> UpdateRecord {
        let mut pending = lock(&self.pending);
        let name = result.component.name().to_string();

        if let Some(existing) = pending.get(&name) {
            let status = existing.status();
            let same_version = *existing.remote_version() == result.remote_version;
            if status.is_in_progress() || (same_version && status != UpdateStatus::Error) {
                debug!(
                    "Keeping {status} update of {name} to {}",
                    existing.remote_version()
                );
                return existing.clone();
            }
            debug!(
                "Replacing {status} update of {name} to {} with {}",
                existing.remote_version(),
                result.remote_version
            );
            existing.discard_artifact();
        }

        let record = UpdateRecord::new(
            result.component,
            result.remote_version,
            result.url,
            self.context.clone(),
        );
        pending.insert(name, record.clone());
        record
    }

    fn record_check_time(&self) -> Result<()> {
        let now = self.clock.now();
        self.store
            .set_option(UPDATER_DOMAIN, KEY_LASTCHECK, &now.to_string())
    }

    /// Start downloads or installs for pending records as configured by
    /// `updater.autoupdate` and `updater.autodownload`.
    ///
    /// Components that must be installed manually are only downloaded.
    pub fn apply_policy(&self, records: &[UpdateRecord]) -> Vec<InstallJob> {
        let settings = self.settings();
        if !settings.auto_update && !settings.auto_download {
            return Vec::new();
        }

        let mut jobs = Vec::new();
        for record in records {
            if record.status() != UpdateStatus::Pending {
                continue;
            }

            let component = record.component();
            let started = if settings.auto_update && !component.requires_manual_install() {
                info!(
                    "Installing {} {} automatically",
                    component.name(),
                    record.remote_version()
                );
                record.start_install()
            } else {
                info!(
                    "Downloading {} {} automatically",
                    component.name(),
                    record.remote_version()
                );
                record.start_download()
            };

            match started {
                Ok(job) => jobs.push(job),
                Err(e) => debug!("Not starting {}: {e}", component.name()),
            }
        }
        jobs
    }

    /// One scheduled cycle: check, then apply the auto-update policy.
    pub fn run_once(&self) -> Vec<InstallJob> {
        match self.check_now() {
            Ok(CheckOutcome::Completed { records, .. }) => self.apply_policy(&records),
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!("Update check failed: {e}");
                Vec::new()
            }
        }
    }

    pub fn next_check_delay(&self) -> NextCheck {
        let settings = self.settings();
        compute_next_delay(settings.last_check, settings.frequency, self.clock.now())
    }

    /// Pending records ordered by component name.
    pub fn pending(&self) -> Vec<UpdateRecord> {
        lock(&self.pending).values().cloned().collect()
    }

    pub fn record(&self, component: &str) -> Option<UpdateRecord> {
        lock(&self.pending).get(component).cloned()
    }

    /// Forget the pending update of `component`, deleting any artifact it
    /// downloaded unless it is mid-pipeline.
    pub fn remove(&self, component: &str) -> Option<UpdateRecord> {
        let record = lock(&self.pending).remove(component)?;
        record.discard_artifact();
        Some(record)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
