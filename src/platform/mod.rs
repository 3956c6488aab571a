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

//! Platform-specific helpers used by the installers.

pub mod file_ops;

pub use file_ops::{atomic_rename, make_executable, replace_file, set_permissions_from_mode};

/// Whether launchers ship as a single script rather than an archive.
pub fn launcher_is_script() -> bool {
    cfg!(unix)
}
