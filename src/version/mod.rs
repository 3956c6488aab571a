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

//! Version identifiers for updatable components.
//!
//! A version is either an integer build number (`20071007`), a tagged
//! release string (`0.6.3`, `1.2rc1`, `1.2-17-gabcdef0`) or invalid. Tagged
//! versions follow the grammar
//!
//! ```text
//! [0-9]+(\.[0-9]+)*((a|b|rc|m)[0-9]+)*(-[0-9]+-g[a-z0-9]{7})?(-SNAPSHOT)?
//! ```
//!
//! A trailing `-SNAPSHOT` is dropped when the version is stored. Ordering
//! lives in [`ordering`].

pub mod ordering;

pub use ordering::compare;

use crate::error::{Result, UpkeepError};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

static INTEGER_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("integer version pattern is valid"));

static TAGGED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)*((a|b|rc|m)[0-9]+)*(-[0-9]+-g[a-z0-9]{7})?(-SNAPSHOT)?$")
        .expect("tagged version pattern is valid")
});

/// Which of the three version shapes a [`Version`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    Integer,
    Tagged,
    Invalid,
}

#[derive(Debug, Clone)]
enum Repr {
    Integer(u64),
    Tagged(String),
    Invalid(String),
}

/// An immutable version identifier.
///
/// Equality and ordering go through [`compare`]. `Ord` and `Hash` are not
/// implemented: the letter-run rules are not antisymmetric when a numeric
/// segment meets a lettered one, and two tags differing only in their git
/// hash compare equal.
#[derive(Debug, Clone)]
pub struct Version {
    repr: Repr,
}

impl Version {
    /// Parses `text`, producing an invalid version when it matches neither grammar.
    pub fn new(text: &str) -> Self {
        if INTEGER_VERSION.is_match(text) {
            if let Ok(number) = text.parse::<u64>() {
                return Self::from(number);
            }
            log::debug!("Integer version '{text}' does not fit in 64 bits");
            return Self::invalid(text);
        }

        if TAGGED_VERSION.is_match(text) {
            let tag = text.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(text);
            return Self {
                repr: Repr::Tagged(tag.to_string()),
            };
        }

        Self::invalid(text)
    }

    /// Parses `text`, rejecting anything that is not a valid version.
    pub fn parse_strict(text: &str) -> Result<Self> {
        let version = Self::new(text);
        if version.is_valid() {
            Ok(version)
        } else {
            Err(UpkeepError::InvalidVersionFormat(text.to_string()))
        }
    }

    /// The unset version, which sorts before every valid version.
    pub fn unknown() -> Self {
        Self::invalid("")
    }

    fn invalid(text: &str) -> Self {
        Self {
            repr: Repr::Invalid(text.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.repr, Repr::Invalid(_))
    }

    pub fn kind(&self) -> VersionKind {
        match self.repr {
            Repr::Integer(_) => VersionKind::Integer,
            Repr::Tagged(_) => VersionKind::Tagged,
            Repr::Invalid(_) => VersionKind::Invalid,
        }
    }

    /// Number of commits past the tag (`1.2-17-gabcdef0` has 17), zero otherwise.
    pub fn commit_count(&self) -> u64 {
        match &self.repr {
            Repr::Tagged(tag) => {
                let (_, commits) = ordering::split_commit_suffix(tag);
                commits.parse().unwrap_or(u64::MAX)
            }
            _ => 0,
        }
    }

    /// Strictly newer than `other` under [`compare`].
    pub fn is_newer_than(&self, other: &Version) -> bool {
        compare(self, other) == Ordering::Greater
    }

    pub(crate) fn as_integer(&self) -> Option<u64> {
        match self.repr {
            Repr::Integer(number) => Some(number),
            _ => None,
        }
    }

    pub(crate) fn as_tag(&self) -> Option<&str> {
        match &self.repr {
            Repr::Tagged(tag) => Some(tag),
            _ => None,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::unknown()
    }
}

impl From<u64> for Version {
    fn from(number: u64) -> Self {
        Self {
            repr: Repr::Integer(number),
        }
    }
}

impl From<&str> for Version {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl FromStr for Version {
    type Err = UpkeepError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_strict(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Integer(number) => write!(f, "{number}"),
            Repr::Tagged(tag) => f.write_str(tag),
            Repr::Invalid(raw) => f.write_str(raw),
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare(self, other))
    }
}
