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

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A zip archive holding `entries`, as served for plugin and bundle updates.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(contents).expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// `config.toml` registering the given `[[components]]` tables and pointing
/// both check endpoints at `server_url`.
pub fn config_toml(server_url: &str, components: &str) -> String {
    format!(
        "[server]\ncheck_url = \"{server_url}/check\"\nnightly_url = \"{server_url}/json/latest\"\n\n{components}"
    )
}

/// A `[[components]]` table for a plugin.
pub fn plugin_entry(name: &str, version: &str, target: &std::path::Path) -> String {
    format!(
        "[[components]]\nkind = \"plugin\"\nname = \"{name}\"\nversion = \"{version}\"\ntarget = {target:?}\n\n"
    )
}

/// A `[[components]]` table for the client binary.
pub fn client_entry(version: &str, target: &std::path::Path, via_launcher: bool) -> String {
    format!(
        "[[components]]\nkind = \"client\"\nname = \"client\"\nversion = \"{version}\"\ntarget = {target:?}\nlaunched_via_launcher = {via_launcher}\n\n"
    )
}
