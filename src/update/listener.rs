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

use crate::update::{UpdateRecord, UpdateStatus};
use std::sync::Weak;

/// Observes status and progress changes of one record.
///
/// Callbacks run on whichever thread drives the record, never while the
/// record's own locks are held.
pub trait UpdateListener: Send + Sync {
    fn status_changed(&self, record: &UpdateRecord, status: UpdateStatus);

    /// `progress` is a fraction in `[0, 1]`.
    fn progress_changed(&self, _record: &UpdateRecord, _progress: f32) {}
}

/// Keeps a listener attached; dropping it detaches the listener.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    pub(super) record: Weak<super::record::RecordInner>,
    pub(super) id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(record) = self.record.upgrade() {
            record.remove_listener(self.id);
        }
    }
}
