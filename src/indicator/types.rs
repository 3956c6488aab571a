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

use std::fmt;

/// Configuration for one progress operation.
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Operation name, e.g. "Downloading" or "Installing".
    pub operation: String,

    /// What the operation acts on, e.g. "ui 1.1".
    pub context: String,

    /// Total units for determinate operations, `None` for a spinner.
    pub total: Option<u64>,

    pub style: ProgressStyle,
}

impl ProgressConfig {
    pub fn new(
        operation: impl Into<String>,
        context: impl Into<String>,
        style: ProgressStyle,
    ) -> Self {
        Self {
            operation: operation.into(),
            context: context.into(),
            total: None,
            style,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStyle {
    /// Percentage of a single transfer.
    Percent,
    /// Items processed out of a batch.
    #[default]
    Count,
}

impl fmt::Display for ProgressStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent => write!(f, "percent"),
            Self::Count => write!(f, "count"),
        }
    }
}

/// Which renderer a [`ProgressIndicator`](super::ProgressIndicator) draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressRendererKind {
    Tty,
    NonTty,
    Silent,
}
