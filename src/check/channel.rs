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

use crate::error::{Result, UpkeepError};
use std::fmt;
use std::str::FromStr;

/// Release stream a user follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateChannel {
    None,
    Stable,
    Unstable,
    Nightly,
}

impl UpdateChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateChannel::None => "NONE",
            UpdateChannel::Stable => "STABLE",
            UpdateChannel::Unstable => "UNSTABLE",
            UpdateChannel::Nightly => "NIGHTLY",
        }
    }

    /// Lenient parse for stored settings: unknown values disable checking.
    pub fn from_config_value(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::warn!("Unknown update channel '{value}', update checks are disabled");
            UpdateChannel::None
        })
    }
}

impl FromStr for UpdateChannel {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(UpdateChannel::None),
            "STABLE" => Ok(UpdateChannel::Stable),
            "UNSTABLE" => Ok(UpdateChannel::Unstable),
            "NIGHTLY" => Ok(UpdateChannel::Nightly),
            _ => Err(UpkeepError::ConfigError(format!(
                "Unknown update channel: {s}"
            ))),
        }
    }
}

impl fmt::Display for UpdateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
