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

//! The update server's line protocol.
//!
//! ```text
//! outofdate <component> <channel> <build stamp> <version> <url>
//! uptodate <component> ...
//! error <message>
//! ```

use crate::error::{Result, UpkeepError};
use crate::version::Version;

const OUTOFDATE_FIELDS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseLine {
    OutOfDate {
        component: String,
        channel: String,
        /// Historical build stamp, not used for ordering.
        build_stamp: String,
        version: Version,
        url: String,
    },
    UpToDate {
        component: String,
    },
    ServerError(String),
    Blank,
}

pub fn parse_response_line(line: &str) -> Result<ResponseLine> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    let Some(status) = fields.first() else {
        return Ok(ResponseLine::Blank);
    };

    match *status {
        "outofdate" => {
            if fields.len() != OUTOFDATE_FIELDS {
                return Err(parse_error(
                    line,
                    format!(
                        "expected {OUTOFDATE_FIELDS} fields, found {}",
                        fields.len()
                    ),
                ));
            }

            let version = Version::new(fields[4]);
            if !version.is_valid() {
                return Err(parse_error(
                    line,
                    format!("'{}' is not a valid version", fields[4]),
                ));
            }

            Ok(ResponseLine::OutOfDate {
                component: fields[1].to_string(),
                channel: fields[2].to_string(),
                build_stamp: fields[3].to_string(),
                version,
                url: fields[5].to_string(),
            })
        }
        "uptodate" => match fields.get(1) {
            Some(component) => Ok(ResponseLine::UpToDate {
                component: component.to_string(),
            }),
            None => Err(parse_error(line, "missing component name".to_string())),
        },
        "error" => Ok(ResponseLine::ServerError(fields[1..].join(" "))),
        other => Err(parse_error(line, format!("unknown status '{other}'"))),
    }
}

fn parse_error(line: &str, reason: String) -> UpkeepError {
    UpkeepError::ResponseParse {
        line: line.trim().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outofdate_line() {
        let parsed =
            parse_response_line("outofdate client STABLE 20071007 0.6.0 http://x/y.jar").unwrap();

        match parsed {
            ResponseLine::OutOfDate {
                component,
                channel,
                build_stamp,
                version,
                url,
            } => {
                assert_eq!(component, "client");
                assert_eq!(channel, "STABLE");
                assert_eq!(build_stamp, "20071007");
                assert_eq!(version, Version::new("0.6.0"));
                assert_eq!(url, "http://x/y.jar");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_wrong_field_count() {
        for line in [
            "outofdate client STABLE 20071007 0.6.0",
            "outofdate client STABLE 20071007 0.6.0 http://x/y.jar extra",
        ] {
            assert!(matches!(
                parse_response_line(line),
                Err(UpkeepError::ResponseParse { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_remote_version() {
        let result = parse_response_line("outofdate client STABLE 1 banana http://x/y.jar");
        match result {
            Err(UpkeepError::ResponseParse { reason, .. }) => assert!(reason.contains("banana")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_other_statuses() {
        assert_eq!(
            parse_response_line("uptodate ui STABLE 1").unwrap(),
            ResponseLine::UpToDate {
                component: "ui".to_string()
            }
        );
        assert_eq!(
            parse_response_line("error Unknown component foo").unwrap(),
            ResponseLine::ServerError("Unknown component foo".to_string())
        );
        assert_eq!(parse_response_line("   ").unwrap(), ResponseLine::Blank);
        assert!(parse_response_line("sideways client").is_err());
        assert!(parse_response_line("uptodate").is_err());
    }
}
