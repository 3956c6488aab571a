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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpkeepError {
    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("Malformed update response '{line}': {reason}")]
    ResponseParse { line: String, reason: String },

    #[error("Failed to download update: {0}")]
    Download(String),

    #[error("Failed to install {component}: {reason}")]
    Install { component: String, reason: String },

    #[error("Archive is corrupt: {0}")]
    CorruptArchive(String),

    #[error("Failed to extract archive: {0}")]
    Extract(String),

    #[error("Cannot move update from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Component '{0}' is not registered")]
    ComponentNotFound(String),

    #[error("No pending update for component '{0}'")]
    NoPendingUpdate(String),

    #[error("Configuration file error: {0}")]
    ConfigFile(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("System error: {0}")]
    SystemError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] attohttpc::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, UpkeepError>;
