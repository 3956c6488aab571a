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

//! Asking remote sources which components are out of date.

mod channel;
mod nightly;
mod policy;
mod response;
mod server;

pub use channel::UpdateChannel;
pub use nightly::NightlyChecker;
pub use policy::{AllowAll, ComponentPolicy, ConfigComponentPolicy};
pub use response::{ResponseLine, parse_response_line};
pub use server::UpdateServerChecker;

use crate::component::Component;
use crate::error::{Result, UpkeepError};
use crate::version::Version;
use std::sync::Arc;

/// A remote source reporting a newer version of one component.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub component: Arc<Component>,
    pub remote_version: Version,
    pub url: String,
    pub channel: UpdateChannel,
}

/// Everything one strategy learned in one cycle.
///
/// Malformed entries land in `errors`; they never hide the valid ones.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
    /// Components the source reported as current.
    pub up_to_date: Vec<String>,
    pub errors: Vec<UpkeepError>,
}

pub trait CheckStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns an error only when the source could not be asked at all.
    fn check_for_updates(
        &self,
        components: &[Arc<Component>],
        channel: UpdateChannel,
    ) -> Result<CheckReport>;
}

/// Merge the results of several strategies so each component keeps the
/// result with the greatest remote version. The first result wins a tie.
pub fn consolidate(results: impl IntoIterator<Item = CheckResult>) -> Vec<CheckResult> {
    let mut merged: Vec<CheckResult> = Vec::new();

    for result in results {
        match merged
            .iter_mut()
            .find(|existing| existing.component.name() == result.component.name())
        {
            Some(existing) => {
                if result.remote_version.is_newer_than(&existing.remote_version) {
                    log::debug!(
                        "{} {} supersedes {} for {}",
                        result.url,
                        result.remote_version,
                        existing.remote_version,
                        result.component.name()
                    );
                    *existing = result;
                }
            }
            None => merged.push(result),
        }
    }

    merged
}

/// Find a component by name among those being checked.
pub(crate) fn find_component<'a>(
    components: &'a [Arc<Component>],
    name: &str,
) -> Option<&'a Arc<Component>> {
    components.iter().find(|component| component.name() == name)
}
