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

//! Total ordering between two [`Version`]s.
//!
//! The rules are kept bit-for-bit compatible with existing update servers,
//! including the direction-dependent handling of milestone (`m`) segments.
//! Nothing here allocates.

use super::Version;
use std::cmp::Ordering;

/// Compares two versions, `Less` meaning `mine` is older than `theirs`.
///
/// Integer versions compare numerically. Invalid versions are equal to each
/// other and older than anything valid. An integer version meeting a tagged
/// one has no tag string and so sorts first.
pub fn compare(mine: &Version, theirs: &Version) -> Ordering {
    if let (Some(a), Some(b)) = (mine.as_integer(), theirs.as_integer()) {
        return a.cmp(&b);
    }

    match (mine.is_valid(), theirs.is_valid()) {
        (false, false) => return Ordering::Equal,
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        (true, true) => {}
    }

    match (mine.as_tag(), theirs.as_tag()) {
        (Some(a), Some(b)) => compare_tags(a, b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_tags(mine: &str, theirs: &str) -> Ordering {
    let (my_main, my_commits) = split_commit_suffix(mine);
    let (their_main, their_commits) = split_commit_suffix(theirs);

    let mut my_segments = Segments::new(my_main);
    let mut their_segments = Segments::new(their_main);

    loop {
        let my_segment = my_segments.next();
        let their_segment = their_segments.next();

        if my_segment.is_none() && their_segment.is_none() {
            break;
        }

        if let Some(decision) = compare_segments(my_segment, their_segment) {
            return decision;
        }
    }

    compare_numeric(my_commits, their_commits)
}

/// Splits `1.2-17-gabcdef0` into `("1.2", "17")`; without a suffix the count is `"0"`.
pub(crate) fn split_commit_suffix(tag: &str) -> (&str, &str) {
    let mut parts = tag.split('-');
    let main = parts.next().unwrap_or(tag);
    let commits = parts.next().filter(|count| is_numeric(count)).unwrap_or("0");
    (main, commits)
}

/// Returns `None` when the segments tie and the walk should continue.
fn compare_segments(mine: Option<&str>, theirs: Option<&str>) -> Option<Ordering> {
    match (mine, theirs) {
        (None, None) => None,
        (Some(m), Some(t)) if is_numeric(m) && is_numeric(t) => {
            match compare_numeric(m, t) {
                Ordering::Equal => None,
                decision => Some(decision),
            }
        }
        (Some(m), Some(t)) if !is_numeric(m) && !is_numeric(t) && m.eq_ignore_ascii_case(t) => {
            None
        }
        (Some(m), None) if is_numeric(m) => Some(Ordering::Greater),
        (None, Some(t)) if is_numeric(t) => Some(Ordering::Less),
        // A missing segment against a lettered one is a release against a pre-release.
        (None, Some(_)) => Some(Ordering::Greater),
        (Some(_), None) => Some(Ordering::Less),
        (Some(m), Some(t)) => Some(compare_letter_runs(m, t)),
    }
}

fn compare_letter_runs(mine: &str, theirs: &str) -> Ordering {
    let (my_letters, my_number) = split_letter_run(mine);
    let (their_letters, their_number) = split_letter_run(theirs);

    if my_letters == their_letters {
        // Decides even on a numeric tie (rc01 against rc1).
        return compare_numeric(my_number, their_number);
    }

    if my_letters == "m" || (my_letters == "a" && their_letters == "b") || their_letters == "rc" {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Splits `rc12` into `("rc", "12")`. A purely numeric segment keeps its
/// digits as the letter run so it never matches a real prefix.
fn split_letter_run(segment: &str) -> (&str, &str) {
    let boundary = segment
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(segment.len());
    if boundary == 0 {
        return (segment, "");
    }
    segment.split_at(boundary)
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Compares two digit strings by value without parsing, so any length works.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Iterates the main part of a tag, splitting on `.` and immediately before
/// each `a`, `b`, `rc` or `m` marker: `1.2.3m1rc2` yields
/// `1`, `2`, `3`, `m1`, `rc2`.
struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Segments<'a> {
    fn new(main: &'a str) -> Self {
        Self { rest: main }
    }

    fn starts_marker(text: &str) -> bool {
        text.starts_with('a') || text.starts_with('b') || text.starts_with('m') || text.starts_with("rc")
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let bytes = self.rest.as_bytes();
        let mut end = self.rest.len();
        let mut skip = 0;
        for index in 0..bytes.len() {
            if bytes[index] == b'.' {
                end = index;
                skip = 1;
                break;
            }
            if index > 0 && Self::starts_marker(&self.rest[index..]) {
                end = index;
                break;
            }
        }

        let segment = &self.rest[..end];
        self.rest = &self.rest[end + skip..];
        Some(segment)
    }
}
