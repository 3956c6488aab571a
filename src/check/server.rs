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

use crate::check::response::{ResponseLine, parse_response_line};
use crate::check::{CheckReport, CheckResult, CheckStrategy, UpdateChannel, find_component};
use crate::component::Component;
use crate::download::{AttohttpcClient, HttpClient, read_text};
use crate::error::{Result, UpkeepError};
use crate::user_agent;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts the installed versions to the update server and reads back one
/// status line per component.
pub struct UpdateServerChecker {
    client: Box<dyn HttpClient>,
    url: String,
}

impl UpdateServerChecker {
    pub fn new(url: impl Into<String>) -> Self {
        let mut client = AttohttpcClient::with_user_agent(user_agent::check_client());
        client.set_timeout(CHECK_TIMEOUT);
        Self::with_client(Box::new(client), url)
    }

    pub fn with_client(client: Box<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// `data=<name>,<CHANNEL>,<version>;...`
pub(crate) fn request_payload(components: &[Arc<Component>], channel: UpdateChannel) -> String {
    let mut payload = String::from("data=");
    for component in components {
        payload.push_str(&format!(
            "{},{channel},{};",
            component.name(),
            component.version()
        ));
    }
    payload
}

impl CheckStrategy for UpdateServerChecker {
    fn name(&self) -> &str {
        "update-server"
    }

    fn check_for_updates(
        &self,
        components: &[Arc<Component>],
        channel: UpdateChannel,
    ) -> Result<CheckReport> {
        let mut report = CheckReport::default();
        if channel == UpdateChannel::None || components.is_empty() {
            log::debug!("Nothing to ask the update server (channel {channel})");
            return Ok(report);
        }

        let payload = request_payload(components, channel);
        log::trace!("POST {} {payload}", self.url);

        let response = self.client.post_form(&self.url, &payload)?;
        let body = read_text(response, &self.url)?;

        for line in body.lines() {
            log::trace!("< {line}");
            match parse_response_line(line) {
                Ok(ResponseLine::OutOfDate {
                    component,
                    version,
                    url,
                    ..
                }) => {
                    let Some(known) = find_component(components, &component) else {
                        report.errors.push(UpkeepError::ResponseParse {
                            line: line.trim().to_string(),
                            reason: format!("unknown component '{component}'"),
                        });
                        continue;
                    };

                    if !version.is_newer_than(known.version()) {
                        log::debug!(
                            "Server offers {component} {version}, installed {} is not older",
                            known.version()
                        );
                        report.up_to_date.push(component);
                        continue;
                    }

                    report.results.push(CheckResult {
                        component: Arc::clone(known),
                        remote_version: version,
                        url,
                        channel,
                    });
                }
                Ok(ResponseLine::UpToDate { component }) => {
                    log::debug!("{component} is up to date");
                    report.up_to_date.push(component);
                }
                Ok(ResponseLine::ServerError(message)) => {
                    log::warn!("Update server reported an error: {message}");
                    report.errors.push(UpkeepError::ResponseParse {
                        line: line.trim().to_string(),
                        reason: format!("server reported an error: {message}"),
                    });
                }
                Ok(ResponseLine::Blank) => {}
                Err(error) => {
                    log::warn!("{error}");
                    report.errors.push(error);
                }
            }
        }

        Ok(report)
    }
}
