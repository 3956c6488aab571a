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

use crate::component::{Component, InstallHost};
use crate::download::{Downloader, ProgressReporter};
use crate::error::{Result, UpkeepError};
use crate::paths;
use crate::update::listener::{Subscription, UpdateListener};
use crate::update::UpdateStatus;
use crate::version::Version;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Collaborators a record needs to download and install.
#[derive(Clone)]
pub struct InstallContext {
    pub downloader: Arc<dyn Downloader>,
    pub host: Arc<dyn InstallHost>,
    /// Directory for temporary artifacts.
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    DownloadOnly,
    Install,
}

struct RecordState {
    status: UpdateStatus,
    progress: f32,
    error: Option<String>,
    manual_instructions: Option<String>,
    artifact: Option<PathBuf>,
}

pub(super) struct RecordInner {
    component: Arc<Component>,
    remote_version: Version,
    url: String,
    context: InstallContext,
    state: Mutex<RecordState>,
    listeners: Mutex<Vec<(u64, Arc<dyn UpdateListener>)>>,
    next_listener_id: AtomicU64,
}

impl RecordInner {
    pub(super) fn remove_listener(&self, id: u64) {
        lock(&self.listeners).retain(|(listener_id, _)| *listener_id != id);
    }
}

/// One available update for one component.
///
/// Cloning shares the same record. Only [`start_download`](Self::start_download)
/// and [`start_install`](Self::start_install) move it forward; everything after
/// happens on the worker thread they spawn.
#[derive(Clone)]
pub struct UpdateRecord {
    inner: Arc<RecordInner>,
}

impl fmt::Debug for UpdateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRecord")
            .field("component", &self.inner.component.name())
            .field("remote_version", &self.inner.remote_version)
            .field("url", &self.inner.url)
            .field("status", &self.status())
            .finish()
    }
}

impl UpdateRecord {
    pub fn new(
        component: Arc<Component>,
        remote_version: Version,
        url: impl Into<String>,
        context: InstallContext,
    ) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                component,
                remote_version,
                url: url.into(),
                context,
                state: Mutex::new(RecordState {
                    status: UpdateStatus::Pending,
                    progress: 0.0,
                    error: None,
                    manual_instructions: None,
                    artifact: None,
                }),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn component(&self) -> &Arc<Component> {
        &self.inner.component
    }

    pub fn remote_version(&self) -> &Version {
        &self.inner.remote_version
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn status(&self) -> UpdateStatus {
        lock(&self.inner.state).status
    }

    pub fn progress(&self) -> f32 {
        lock(&self.inner.state).progress
    }

    pub fn error_message(&self) -> Option<String> {
        lock(&self.inner.state).error.clone()
    }

    pub fn manual_instructions(&self) -> Option<String> {
        lock(&self.inner.state).manual_instructions.clone()
    }

    /// The downloaded artifact while the record is `DOWNLOADED` or `MANUAL_REQUIRED`.
    pub fn artifact_path(&self) -> Option<PathBuf> {
        lock(&self.inner.state).artifact.clone()
    }

    /// Same record identity: both handles share state.
    pub fn ptr_eq(&self, other: &UpdateRecord) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn subscribe(&self, listener: Arc<dyn UpdateListener>) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, listener));
        Subscription {
            record: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Download the artifact and stop at `DOWNLOADED`.
    pub fn start_download(&self) -> Result<InstallJob> {
        self.begin(UpdateStatus::Pending, UpdateStatus::Downloading)?;
        self.spawn_worker(Mode::DownloadOnly)
    }

    /// Download (unless already downloaded) and install.
    ///
    /// Components that need a manual install stop at `MANUAL_REQUIRED`
    /// with instructions instead of touching installed files.
    pub fn start_install(&self) -> Result<InstallJob> {
        let current = self.status();
        match current {
            UpdateStatus::Pending => {
                self.begin(UpdateStatus::Pending, UpdateStatus::Downloading)?;
                self.spawn_worker(Mode::Install)
            }
            UpdateStatus::Downloaded if self.inner.component.requires_manual_install() => {
                self.begin(UpdateStatus::Downloaded, UpdateStatus::ManualRequired)?;
                Ok(InstallJob {
                    record: self.clone(),
                    handle: None,
                })
            }
            UpdateStatus::Downloaded => {
                self.begin(UpdateStatus::Downloaded, UpdateStatus::Installing)?;
                self.spawn_worker(Mode::Install)
            }
            other => Err(UpkeepError::InvalidTransition {
                from: other.to_string(),
                to: UpdateStatus::Installing.to_string(),
            }),
        }
    }

    /// Delete the downloaded artifact once the record leaves the pending
    /// set. Records mid-pipeline keep theirs.
    pub(crate) fn discard_artifact(&self) {
        let mut state = lock(&self.inner.state);
        if state.status.is_in_progress() {
            return;
        }
        if let Some(artifact) = state.artifact.take() {
            log::debug!(
                "Discarding {} artifact {}",
                self.inner.component.name(),
                artifact.display()
            );
            discard(&artifact);
        }
    }

    /// A fresh `PENDING` record for the same update, after a failure.
    pub fn retry(&self) -> Result<UpdateRecord> {
        let status = self.status();
        if status != UpdateStatus::Error {
            return Err(UpkeepError::InvalidTransition {
                from: status.to_string(),
                to: UpdateStatus::Pending.to_string(),
            });
        }

        Ok(UpdateRecord::new(
            Arc::clone(&self.inner.component),
            self.inner.remote_version.clone(),
            self.inner.url.clone(),
            self.inner.context.clone(),
        ))
    }

    /// Atomically move from `expected` to `next`, so racing callers cannot
    /// both start a pipeline.
    fn begin(&self, expected: UpdateStatus, next: UpdateStatus) -> Result<()> {
        {
            let mut state = lock(&self.inner.state);
            if state.status != expected || !state.status.can_transition_to(next) {
                return Err(UpkeepError::InvalidTransition {
                    from: state.status.to_string(),
                    to: next.to_string(),
                });
            }
            state.status = next;
            state.progress = 0.0;
            if next == UpdateStatus::ManualRequired {
                state.manual_instructions = state
                    .artifact
                    .as_deref()
                    .map(|artifact| self.inner.component.manual_instructions(artifact));
            }
        }
        self.notify_status(next);
        Ok(())
    }

    fn spawn_worker(&self, mode: Mode) -> Result<InstallJob> {
        let record = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("upkeep-{}", self.inner.component.name()))
            .spawn(move || record.run_pipeline(mode));

        match spawned {
            Ok(handle) => Ok(InstallJob {
                record: self.clone(),
                handle: Some(handle),
            }),
            Err(e) => {
                let error = UpkeepError::SystemError(format!("Failed to start worker: {e}"));
                self.fail(&error);
                Err(error)
            }
        }
    }

    fn run_pipeline(&self, mode: Mode) -> UpdateStatus {
        let component = Arc::clone(&self.inner.component);

        let artifact = if self.status() == UpdateStatus::Downloading {
            match self.download() {
                Ok(artifact) => artifact,
                Err(error) => return self.fail(&error),
            }
        } else {
            match self.artifact_path() {
                Some(artifact) => artifact,
                None => {
                    return self.fail(&UpkeepError::Install {
                        component: component.name().to_string(),
                        reason: "downloaded artifact is missing".to_string(),
                    });
                }
            }
        };

        if mode == Mode::DownloadOnly {
            return self.transition(UpdateStatus::Downloaded);
        }

        if component.requires_manual_install() {
            lock(&self.inner.state).manual_instructions =
                Some(component.manual_instructions(&artifact));
            log::info!(
                "{} {} must be installed manually",
                component.name(),
                self.inner.remote_version
            );
            return self.transition(UpdateStatus::ManualRequired);
        }

        if self.status() != UpdateStatus::Installing {
            self.transition(UpdateStatus::Installing);
        }

        let result = component.install(&artifact, self.inner.context.host.as_ref());
        discard(&artifact);
        lock(&self.inner.state).artifact = None;

        match result {
            Ok(outcome) if outcome.restart_needed => {
                log::info!(
                    "Installed {} {}, restart required",
                    component.name(),
                    self.inner.remote_version
                );
                self.transition(UpdateStatus::RestartNeeded)
            }
            Ok(_) => {
                log::info!("Installed {} {}", component.name(), self.inner.remote_version);
                self.transition(UpdateStatus::Installed)
            }
            Err(error) => self.fail(&error),
        }
    }

    fn download(&self) -> Result<PathBuf> {
        let artifact = temp_artifact_path(
            &self.inner.context.download_dir,
            self.inner.component.name(),
        );
        log::debug!(
            "Downloading {} {} from {}",
            self.inner.component.name(),
            self.inner.remote_version,
            self.inner.url
        );

        let mut reporter = RecordProgress {
            record: self.clone(),
            total: 0,
        };
        self.inner
            .context
            .downloader
            .download(&self.inner.url, &artifact, &mut reporter)?;

        lock(&self.inner.state).artifact = Some(artifact.clone());
        Ok(artifact)
    }

    fn transition(&self, next: UpdateStatus) -> UpdateStatus {
        {
            let mut state = lock(&self.inner.state);
            if !state.status.can_transition_to(next) {
                log::error!(
                    "Ignoring transition {} -> {next} for {}",
                    state.status,
                    self.inner.component.name()
                );
                return state.status;
            }
            state.status = next;
            state.progress = 0.0;
        }
        self.notify_status(next);
        next
    }

    fn fail(&self, error: &UpkeepError) -> UpdateStatus {
        log::warn!(
            "Update of {} to {} failed: {error}",
            self.inner.component.name(),
            self.inner.remote_version
        );
        let artifact = {
            let mut state = lock(&self.inner.state);
            state.error = Some(error.to_string());
            state.artifact.take()
        };
        if let Some(artifact) = artifact {
            discard(&artifact);
        }
        self.transition(UpdateStatus::Error)
    }

    fn set_progress(&self, progress: f32) {
        let progress = progress.clamp(0.0, 1.0);
        {
            let mut state = lock(&self.inner.state);
            if state.status != UpdateStatus::Downloading {
                return;
            }
            state.progress = progress;
        }
        for listener in self.listeners() {
            listener.progress_changed(self, progress);
        }
    }

    fn notify_status(&self, status: UpdateStatus) {
        for listener in self.listeners() {
            listener.status_changed(self, status);
        }
    }

    fn listeners(&self) -> Vec<Arc<dyn UpdateListener>> {
        lock(&self.inner.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

/// Handle on a record's worker thread.
pub struct InstallJob {
    record: UpdateRecord,
    handle: Option<JoinHandle<UpdateStatus>>,
}

impl InstallJob {
    pub fn record(&self) -> &UpdateRecord {
        &self.record
    }

    /// Block until the worker finishes and return the status it left.
    pub fn wait(self) -> UpdateStatus {
        match self.handle {
            None => self.record.status(),
            Some(handle) => match handle.join() {
                Ok(status) => status,
                Err(_) => self.record.fail(&UpkeepError::SystemError(
                    "update worker panicked".to_string(),
                )),
            },
        }
    }
}

struct RecordProgress {
    record: UpdateRecord,
    total: u64,
}

impl ProgressReporter for RecordProgress {
    fn on_start(&mut self, total_bytes: u64) {
        self.total = total_bytes;
    }

    fn on_progress(&mut self, bytes_downloaded: u64) {
        if self.total > 0 {
            self.record
                .set_progress(bytes_downloaded as f32 / self.total as f32);
        }
    }

    fn on_complete(&mut self) {
        self.record.set_progress(1.0);
    }
}

/// `<download_dir>/<component>-<random>`, unique per attempt.
fn temp_artifact_path(download_dir: &Path, component: &str) -> PathBuf {
    let stem = paths::sanitize_segment(component).unwrap_or_else(|| "component".to_string());
    download_dir.join(format!("{stem}-{}", uuid::Uuid::new_v4().simple()))
}

fn discard(artifact: &Path) {
    if artifact.exists() {
        if let Err(e) = fs::remove_file(artifact) {
            log::warn!("Failed to remove {}: {e}", artifact.display());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod record_tests;
