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

//! On-disk install steps, one per component kind.

use crate::archive;
use crate::component::{BundleKind, InstallHost, InstallOutcome};
use crate::error::Result;
use crate::platform::{self, file_ops};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const DEFERRED_SUFFIX: &str = ".update";

/// Swap the artifact over the client's backing file.
pub(super) fn replace_binary(artifact: &Path, target: &Path) -> Result<InstallOutcome> {
    ensure_parent(target)?;
    file_ops::replace_file(artifact, target)?;
    log::info!("Replaced {}", target.display());
    Ok(InstallOutcome {
        restart_needed: true,
    })
}

pub(super) fn replace_launcher(
    artifact: &Path,
    target: &Path,
    install_dir: &Path,
) -> Result<InstallOutcome> {
    if platform::launcher_is_script() {
        ensure_parent(target)?;
        file_ops::replace_file(artifact, target)?;
        file_ops::make_executable(target)?;
        log::info!("Replaced launcher script {}", target.display());
    } else {
        archive::extract_archive(artifact, install_dir)?;
        remove_artifact(artifact);
        log::info!("Extracted launcher into {}", install_dir.display());
    }

    Ok(InstallOutcome {
        restart_needed: true,
    })
}

/// Install a plugin, deferring behind a `.update` sidecar while it is loaded.
pub(super) fn install_plugin(
    name: &str,
    artifact: &Path,
    target: &Path,
    host: &dyn InstallHost,
) -> Result<InstallOutcome> {
    archive::verify_archive(artifact)?;
    ensure_parent(target)?;

    if host.is_plugin_loaded(name) {
        let sidecar = deferred_path(target);
        file_ops::replace_file(artifact, &sidecar)?;
        log::info!(
            "Plugin {name} is loaded, staged update at {}",
            sidecar.display()
        );
        return Ok(InstallOutcome {
            restart_needed: true,
        });
    }

    file_ops::replace_file(artifact, target)?;
    host.plugin_updated(name, target);
    log::info!("Replaced plugin {name} at {}", target.display());
    Ok(InstallOutcome {
        restart_needed: false,
    })
}

pub(super) fn extract_bundle(
    bundle: BundleKind,
    artifact: &Path,
    target_dir: &Path,
    host: &dyn InstallHost,
) -> Result<InstallOutcome> {
    archive::extract_archive(artifact, target_dir)?;
    remove_artifact(artifact);
    host.reload_resources(bundle);
    Ok(InstallOutcome {
        restart_needed: false,
    })
}

/// `plugins/ui.jar` becomes `plugins/ui.jar.update`.
pub(crate) fn deferred_path(target: &Path) -> PathBuf {
    let mut file_name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    file_name.push(DEFERRED_SUFFIX);
    target.with_file_name(file_name)
}

fn ensure_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn remove_artifact(artifact: &Path) {
    if let Err(e) = fs::remove_file(artifact) {
        log::warn!("Failed to remove {}: {e}", artifact.display());
    }
}
