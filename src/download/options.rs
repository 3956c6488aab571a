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

use crate::config::DownloadConfig;
pub use crate::download::client::DEFAULT_TIMEOUT;
use std::time::Duration;

/// Largest artifact accepted when the configuration does not say otherwise.
pub const MAX_DOWNLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// Limits applied to every artifact download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Timeout for the whole transfer
    pub timeout: Duration,

    /// Maximum allowed file size in bytes
    pub max_size: u64,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_size: MAX_DOWNLOAD_SIZE,
        }
    }
}

impl From<&DownloadConfig> for DownloadOptions {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_size: config.max_size_mb.saturating_mul(1024 * 1024),
        }
    }
}
