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

use crate::indicator::{ProgressConfig, ProgressIndicator, ProgressRendererKind};
use std::io;

/// No output at all, for `--no-progress`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl SilentProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressIndicator for SilentProgress {
    fn start(&mut self, _config: ProgressConfig) {}

    fn update(&mut self, _current: u64, _total: Option<u64>) {}

    fn set_message(&mut self, _message: String) {}

    fn complete(&mut self, _message: Option<String>) {}

    // Errors reach the user through the command's result.
    fn error(&mut self, _message: String) {}

    fn create_child(&mut self) -> Box<dyn ProgressIndicator> {
        Box::new(SilentProgress)
    }

    fn println(&self, _message: &str) -> io::Result<()> {
        Ok(())
    }

    fn success(&self, _message: &str) -> io::Result<()> {
        Ok(())
    }

    fn renderer_kind(&self) -> ProgressRendererKind {
        ProgressRendererKind::Silent
    }
}
