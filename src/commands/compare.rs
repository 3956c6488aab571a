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

use crate::error::Result;
use crate::version::{Version, compare};
use std::cmp::Ordering;

/// Prints how two version strings order.
pub struct CompareCommand;

impl CompareCommand {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    pub fn execute(&self, left: &str, right: &str, strict: bool) -> Result<()> {
        let (left, right) = if strict {
            (Version::parse_strict(left)?, Version::parse_strict(right)?)
        } else {
            (Version::new(left), Version::new(right))
        };

        println!("{}", describe(&left, &right));
        Ok(())
    }
}

fn describe(left: &Version, right: &Version) -> String {
    let symbol = match compare(left, right) {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    format!("{} {symbol} {}", display(left), display(right))
}

fn display(version: &Version) -> String {
    if version.is_valid() {
        version.to_string()
    } else {
        format!("{version} (invalid)")
    }
}
