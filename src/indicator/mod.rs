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

//! Terminal feedback for downloads and installs.
//!
//! [`ProgressFactory`] picks a renderer for the environment: animated bars on
//! a terminal, plain lines in CI or when output is redirected, and nothing at
//! all for `--no-progress`.

mod factory;
mod indicatif;
mod silent;
mod simple;
mod status;
mod types;

pub use factory::ProgressFactory;
pub use self::indicatif::IndicatifProgress;
pub use silent::SilentProgress;
pub use simple::SimpleProgress;
pub use status::StatusReporter;
pub use types::{ProgressConfig, ProgressRendererKind, ProgressStyle};

use std::io;

/// Core trait for progress indicator implementations.
///
/// Determinate operations (with a total) show a bar, indeterminate ones a
/// spinner.
pub trait ProgressIndicator: Send + Sync {
    fn start(&mut self, config: ProgressConfig);

    /// `total` overrides the total given to `start` when present.
    fn update(&mut self, current: u64, total: Option<u64>);

    fn set_message(&mut self, message: String);

    /// Finish successfully. The message defaults to "Complete".
    fn complete(&mut self, message: Option<String>);

    /// Finish with a failure. Errors stay visible in every renderer except silent.
    fn error(&mut self, message: String);

    /// A sibling indicator rendered alongside this one.
    fn create_child(&mut self) -> Box<dyn ProgressIndicator>;

    /// Print a line without corrupting any bars being drawn.
    fn println(&self, message: &str) -> io::Result<()>;

    fn success(&self, message: &str) -> io::Result<()> {
        self.println(&format!("✓ {message}"))
    }

    fn renderer_kind(&self) -> ProgressRendererKind;
}
