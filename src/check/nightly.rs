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

use crate::check::{CheckReport, CheckResult, CheckStrategy, UpdateChannel, find_component};
use crate::component::Component;
use crate::download::{AttohttpcClient, HttpClient, read_text};
use crate::error::Result;
use crate::user_agent;
use crate::version::Version;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static NIGHTLY_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)-([^-]+(-[0-9]+-g[0-9a-f]+)?)(-SNAPSHOT).jar?$")
        .expect("nightly file pattern is valid")
});

/// One entry of the nightly build listing.
#[derive(Debug, Clone, Deserialize)]
pub struct NightlyFile {
    pub name: String,
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    /// Either an HTTP date string or epoch seconds, depending on the server.
    #[serde(default)]
    pub mtime: Option<serde_json::Value>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Reads the JSON listing of nightly builds. Only consulted on the
/// `NIGHTLY` channel.
pub struct NightlyChecker {
    client: Box<dyn HttpClient>,
    url: String,
}

impl NightlyChecker {
    pub fn new(url: impl Into<String>) -> Self {
        let client = AttohttpcClient::with_user_agent(user_agent::check_client());
        Self::with_client(Box::new(client), url)
    }

    pub fn with_client(client: Box<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn fetch_listing(&self) -> Option<Vec<Option<NightlyFile>>> {
        let body = match self
            .client
            .get(&self.url, vec![("Accept".to_string(), "application/json".to_string())])
            .and_then(|response| read_text(response, &self.url))
        {
            Ok(body) => body,
            Err(error) => {
                log::warn!("Error when getting nightly listing: {error}");
                return None;
            }
        };

        match serde_json::from_str(&body) {
            Ok(listing) => Some(listing),
            Err(error) => {
                log::warn!("Nightly listing at {} is not valid JSON: {error}", self.url);
                None
            }
        }
    }
}

/// Splits `ui-0.6.3-14-gabcdef0-SNAPSHOT.jar` into `("ui", "0.6.3-14-gabcdef0")`.
pub(crate) fn parse_nightly_name(file_name: &str) -> Option<(&str, &str)> {
    let captures = NIGHTLY_FILE_NAME.captures(file_name)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

impl CheckStrategy for NightlyChecker {
    fn name(&self) -> &str {
        "nightly"
    }

    fn check_for_updates(
        &self,
        components: &[Arc<Component>],
        channel: UpdateChannel,
    ) -> Result<CheckReport> {
        let mut report = CheckReport::default();
        if channel != UpdateChannel::Nightly {
            log::debug!("Channel {channel} is not nightly, skipping nightly listing");
            return Ok(report);
        }

        let Some(listing) = self.fetch_listing() else {
            return Ok(report);
        };

        let base = self.url.trim_end_matches('/');
        let mut latest: HashMap<&str, (Version, String)> = HashMap::new();
        for file in listing.iter().flatten() {
            let Some((component, version)) = parse_nightly_name(&file.name) else {
                log::trace!("Ignoring nightly file {}", file.name);
                continue;
            };
            log::trace!(
                "Nightly {} ({}, {:?} bytes, mtime {:?})",
                file.name,
                file.file_type.as_deref().unwrap_or("file"),
                file.size,
                file.mtime
            );
            latest.insert(
                component,
                (Version::new(version), format!("{base}/{}", file.name)),
            );
        }

        for (name, (version, url)) in latest {
            let Some(component) = find_component(components, name) else {
                continue;
            };
            if version.is_newer_than(component.version()) {
                report.results.push(CheckResult {
                    component: Arc::clone(component),
                    remote_version: version,
                    url,
                    channel,
                });
            } else {
                report.up_to_date.push(name.to_string());
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::{MockHttpClient, MockResponse, client_component, plugin_component};
    use std::path::PathBuf;

    const LISTING: &str = r#"[
        {"name": "client-0.6.3-14-gabcdef0-SNAPSHOT.jar", "type": "file", "mtime": 1700000000, "size": 1024},
        {"name": "ui-4-SNAPSHOT.jar", "type": "file"},
        {"name": "dcc-0.1-SNAPSHOT.jar", "type": "file"},
        {"name": "README", "type": "file"},
        null
    ]"#;

    fn components() -> Vec<Arc<Component>> {
        vec![
            Arc::new(client_component("0.6.3", PathBuf::from(".client.jar"), true)),
            Arc::new(plugin_component("ui", "5", PathBuf::from("ui.jar"))),
        ]
    }

    #[test]
    fn test_parse_nightly_name() {
        assert_eq!(
            parse_nightly_name("client-0.6.3-14-gabcdef0-SNAPSHOT.jar"),
            Some(("client", "0.6.3-14-gabcdef0"))
        );
        assert_eq!(parse_nightly_name("ui-4-SNAPSHOT.jar"), Some(("ui", "4")));
        assert_eq!(parse_nightly_name("client-0.6.3.jar"), None);
    }

    #[test]
    fn test_nightly_listing() {
        let client = MockHttpClient::new(vec![MockResponse::ok(LISTING)]);
        let checker = NightlyChecker::with_client(Box::new(client), "http://nightlies/latest/");

        let report = checker
            .check_for_updates(&components(), UpdateChannel::Nightly)
            .unwrap();

        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.component.name(), "client");
        assert_eq!(result.remote_version.to_string(), "0.6.3-14-gabcdef0");
        assert_eq!(
            result.url,
            "http://nightlies/latest/client-0.6.3-14-gabcdef0-SNAPSHOT.jar"
        );
        assert_eq!(result.channel, UpdateChannel::Nightly);
        assert_eq!(report.up_to_date, vec!["ui".to_string()]);
    }

    #[test]
    fn test_listing_with_http_date_mtime() {
        let listing = r#"[
            {"name": "client-0.6.3-14-gabcdef0-SNAPSHOT.jar", "type": "file",
             "mtime": "Mon, 19 Jan 2015 18:05:14 GMT", "size": 1024}
        ]"#;
        let client = MockHttpClient::new(vec![MockResponse::ok(listing)]);
        let checker = NightlyChecker::with_client(Box::new(client), "http://nightlies/latest");

        let report = checker
            .check_for_updates(&components(), UpdateChannel::Nightly)
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].component.name(), "client");
        assert_eq!(
            report.results[0].url,
            "http://nightlies/latest/client-0.6.3-14-gabcdef0-SNAPSHOT.jar"
        );
    }

    #[test]
    fn test_other_channels_skip_listing() {
        let client = MockHttpClient::new(Vec::new());
        let requests = client.requests();
        let checker = NightlyChecker::with_client(Box::new(client), "http://nightlies/latest");

        let report = checker
            .check_for_updates(&components(), UpdateChannel::Stable)
            .unwrap();

        assert!(report.results.is_empty());
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_broken_json_yields_nothing() {
        let client = MockHttpClient::new(vec![MockResponse::ok("[{\"name\": ")]);
        let checker = NightlyChecker::with_client(Box::new(client), "http://nightlies/latest");

        let report = checker
            .check_for_updates(&components(), UpdateChannel::Nightly)
            .unwrap();

        assert!(report.results.is_empty());
    }

    #[test]
    fn test_transport_failure_yields_nothing() {
        let client = MockHttpClient::new(vec![MockResponse::status(500)]);
        let checker = NightlyChecker::with_client(Box::new(client), "http://nightlies/latest");

        let report = checker
            .check_for_updates(&components(), UpdateChannel::Nightly)
            .unwrap();

        assert!(report.results.is_empty());
    }
}
