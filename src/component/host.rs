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

use crate::component::BundleKind;
use std::path::Path;

/// The running application, as seen by installers.
///
/// Every method has a no-op default so embedders implement only what they
/// can act on.
pub trait InstallHost: Send + Sync {
    /// Whether the named plugin is loaded and so cannot be replaced in place.
    fn is_plugin_loaded(&self, _name: &str) -> bool {
        false
    }

    /// Called after a plugin file was replaced while unloaded.
    fn plugin_updated(&self, _name: &str, _path: &Path) {}

    /// Called after a bundle was extracted so the host re-reads that domain.
    fn reload_resources(&self, _bundle: BundleKind) {}
}

/// Host with nothing loaded, used by the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl InstallHost for NoopHost {}
