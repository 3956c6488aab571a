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

//! Installable components and how each kind applies a downloaded artifact.
//!
//! The set of kinds is closed: a client binary, its launcher, plugins and
//! resource bundles. They share one contract (name, version, capability
//! flags, install) and differ only in what `install` does on disk.

mod host;
mod install;
mod registry;

pub use host::{InstallHost, NoopHost};
pub use registry::{ComponentRegistry, StaticRegistry};

use crate::error::{Result, UpkeepError};
use crate::version::Version;
use std::fmt;
use std::path::{Path, PathBuf};

/// Resource domains shipped as archives and extracted over a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleKind {
    DefaultSettings,
    ModeAliases,
    ActionPack,
}

impl BundleKind {
    pub fn friendly_name(&self) -> &'static str {
        match self {
            BundleKind::DefaultSettings => "Default settings",
            BundleKind::ModeAliases => "Mode aliases",
            BundleKind::ActionPack => "Action pack",
        }
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.friendly_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    /// The main application binary. `target` is the backing file the running
    /// client is loaded from.
    ClientBinary {
        target: PathBuf,
        launched_via_launcher: bool,
    },
    /// The launcher that starts the client. On Unix it is a single script at
    /// `target`; elsewhere it ships as an archive extracted into `install_dir`.
    LauncherBinary { target: PathBuf, install_dir: PathBuf },
    Plugin { target: PathBuf },
    ResourceBundle {
        bundle: BundleKind,
        target_dir: PathBuf,
    },
}

impl ComponentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::ClientBinary { .. } => "client",
            ComponentKind::LauncherBinary { .. } => "launcher",
            ComponentKind::Plugin { .. } => "plugin",
            ComponentKind::ResourceBundle { .. } => "bundle",
        }
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOutcome {
    pub restart_needed: bool,
}

/// One independently versioned, installable unit.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    friendly_name: Option<String>,
    version: Version,
    kind: ComponentKind,
}

impl Component {
    pub fn new(name: impl Into<String>, version: Version, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            friendly_name: None,
            version,
            kind,
        }
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn friendly_name(&self) -> String {
        if let Some(name) = &self.friendly_name {
            return name.clone();
        }
        match &self.kind {
            ComponentKind::ClientBinary { .. } => "Client".to_string(),
            ComponentKind::LauncherBinary { .. } => "Launcher".to_string(),
            ComponentKind::Plugin { .. } => format!("Plugin: {}", self.name),
            ComponentKind::ResourceBundle { bundle, .. } => bundle.friendly_name().to_string(),
        }
    }

    pub fn friendly_version(&self) -> String {
        if self.version.is_valid() {
            self.version.to_string()
        } else {
            "unknown".to_string()
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Whether an install of this kind usually takes effect only after a restart.
    ///
    /// Plugins decide at install time, depending on whether they are loaded.
    pub fn requires_restart(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::ClientBinary { .. } | ComponentKind::LauncherBinary { .. }
        )
    }

    pub fn requires_manual_install(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::ClientBinary {
                launched_via_launcher: false,
                ..
            }
        )
    }

    /// Steps a person must follow to apply the artifact at `artifact`.
    pub fn manual_instructions(&self, artifact: &Path) -> String {
        match &self.kind {
            ComponentKind::ClientBinary { target, .. } => format!(
                "A new version of {friendly} has been downloaded to\n  {artifact}\n\
                 The client was not started by its launcher, so it cannot replace itself.\n\
                 Close the client, then replace\n  {target}\nwith the downloaded file and start it again.",
                friendly = self.friendly_name(),
                artifact = artifact.display(),
                target = target.display(),
            ),
            _ => String::new(),
        }
    }

    /// Apply the downloaded artifact.
    ///
    /// Components that require a manual install refuse and leave `artifact`
    /// in place.
    pub fn install(&self, artifact: &Path, host: &dyn InstallHost) -> Result<InstallOutcome> {
        if self.requires_manual_install() {
            return Err(UpkeepError::Install {
                component: self.name.clone(),
                reason: "this component must be installed manually".to_string(),
            });
        }

        let result = match &self.kind {
            ComponentKind::ClientBinary { target, .. } => install::replace_binary(artifact, target),
            ComponentKind::LauncherBinary {
                target,
                install_dir,
            } => install::replace_launcher(artifact, target, install_dir),
            ComponentKind::Plugin { target } => {
                install::install_plugin(&self.name, artifact, target, host)
            }
            ComponentKind::ResourceBundle { bundle, target_dir } => {
                install::extract_bundle(*bundle, artifact, target_dir, host)
            }
        };

        result.map_err(|error| match error {
            UpkeepError::Install { .. } | UpkeepError::CorruptArchive(_) => error,
            UpkeepError::SecurityError(_) => error,
            other => UpkeepError::Install {
                component: self.name.clone(),
                reason: other.to_string(),
            },
        })
    }
}
