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

use crate::error::UpkeepError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a UpkeepError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a UpkeepError) -> Self {
        let (suggestion, details) = match error {
            UpkeepError::InvalidVersionFormat(msg) => {
                let suggestion = Some(
                    "Versions are either a build number ('20071007') or a tag such as '0.6.3', \
                     '1.2rc1' or '1.2-17-gabcdef0'."
                        .to_string(),
                );
                let details = Some(format!("Invalid format: {msg}"));
                (suggestion, details)
            }
            UpkeepError::ResponseParse { line, .. } => {
                let suggestion = Some(
                    "The update server sent a line this version of upkeep does not understand. \
                     Other components were still checked."
                        .to_string(),
                );
                let details = Some(format!("Offending line: {line}"));
                (suggestion, details)
            }
            UpkeepError::NetworkError(msg) | UpkeepError::Download(msg) => {
                let suggestion = Some(
                    "Check your internet connection and proxy settings (HTTP_PROXY, HTTPS_PROXY), \
                     then run 'upkeep check' again."
                        .to_string(),
                );
                let details = Some(format!("Network operation failed: {msg}"));
                (suggestion, details)
            }
            UpkeepError::Http(_) => {
                let suggestion = Some(
                    "Check your internet connection and proxy settings (HTTP_PROXY, HTTPS_PROXY)."
                        .to_string(),
                );
                (suggestion, None)
            }
            UpkeepError::Install { component, .. } => {
                let suggestion = Some(format!(
                    "The previous version of '{component}' is still in place. Run 'upkeep \
                     install {component}' to try again."
                ));
                (suggestion, None)
            }
            UpkeepError::CorruptArchive(msg) => {
                let suggestion = Some(
                    "The downloaded file was discarded without changing anything. Run 'upkeep \
                     check' to fetch a fresh copy."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            UpkeepError::InvalidTransition { from, .. } => {
                let suggestion = Some(format!(
                    "The update is already {from}. Run 'upkeep check' to obtain a fresh update \
                     record."
                ));
                (suggestion, None)
            }
            UpkeepError::ComponentNotFound(name) | UpkeepError::NoPendingUpdate(name) => {
                let suggestion = Some(format!(
                    "Run 'upkeep list' to see registered components, and 'upkeep check' to see \
                     which have updates. '{name}' was not found."
                ));
                (suggestion, None)
            }
            UpkeepError::ConfigFile(msg) | UpkeepError::ConfigError(msg) => {
                let suggestion = Some(
                    "Check config.toml and settings.toml in your upkeep home directory \
                     (UPKEEP_HOME, default ~/.upkeep)."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            UpkeepError::PermissionDenied(path) => {
                let suggestion = if cfg!(windows) {
                    Some("Run the terminal as Administrator or adjust folder permissions.".to_string())
                } else {
                    Some(format!(
                        "Make sure you can write to '{path}', or install as the user that owns it."
                    ))
                };
                (suggestion, None)
            }
            UpkeepError::SecurityError(msg) => {
                let suggestion = Some(
                    "The archive tried to write outside its target directory and was rejected."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
