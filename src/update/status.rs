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

use std::fmt;

/// Where an [`UpdateRecord`](crate::update::UpdateRecord) is in its pipeline.
///
/// ```text
/// PENDING -> DOWNLOADING -> INSTALLING -> INSTALLED | RESTART_NEEDED
///                 |             \-> ERROR
///                 |-> DOWNLOADED -> INSTALLING
///                 |-> MANUAL_REQUIRED
///                 \-> ERROR
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateStatus {
    Pending,
    Downloading,
    /// Downloaded in download-only mode, waiting for an install.
    Downloaded,
    Installing,
    Installed,
    RestartNeeded,
    /// Downloaded, but a person has to apply it.
    ManualRequired,
    Error,
}

impl UpdateStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UpdateStatus::Installed
                | UpdateStatus::RestartNeeded
                | UpdateStatus::ManualRequired
                | UpdateStatus::Error
        )
    }

    /// A worker currently owns the record.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, UpdateStatus::Downloading | UpdateStatus::Installing)
    }

    pub fn can_transition_to(&self, next: UpdateStatus) -> bool {
        use UpdateStatus::*;

        matches!(
            (self, next),
            (Pending, Downloading)
                | (Downloading, Downloaded | Installing | ManualRequired | Error)
                | (Downloaded, Installing | ManualRequired | Error)
                | (Installing, Installed | RestartNeeded | Error)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Pending => "PENDING",
            UpdateStatus::Downloading => "DOWNLOADING",
            UpdateStatus::Downloaded => "DOWNLOADED",
            UpdateStatus::Installing => "INSTALLING",
            UpdateStatus::Installed => "INSTALLED",
            UpdateStatus::RestartNeeded => "RESTART_NEEDED",
            UpdateStatus::ManualRequired => "MANUAL_REQUIRED",
            UpdateStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
