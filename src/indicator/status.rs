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

use crate::indicator::{ProgressFactory, ProgressIndicator, ProgressRendererKind};
use std::sync::{Arc, Mutex};

/// Operation, step and outcome lines routed through the shared indicator so
/// they interleave cleanly with progress bars.
pub struct StatusReporter {
    progress: Arc<Mutex<Box<dyn ProgressIndicator>>>,
    renderer_kind: ProgressRendererKind,
}

impl StatusReporter {
    pub fn new(no_progress: bool) -> Self {
        Self::with_indicator(ProgressFactory::create(no_progress))
    }

    pub fn with_indicator(indicator: Box<dyn ProgressIndicator>) -> Self {
        let renderer_kind = indicator.renderer_kind();
        Self {
            progress: Arc::new(Mutex::new(indicator)),
            renderer_kind,
        }
    }

    /// The indicator behind this reporter, for creating per-item bars.
    pub fn progress_handle(&self) -> Arc<Mutex<Box<dyn ProgressIndicator>>> {
        Arc::clone(&self.progress)
    }

    pub fn is_silent(&self) -> bool {
        matches!(self.renderer_kind, ProgressRendererKind::Silent)
    }

    fn with_progress<R>(&self, f: impl FnOnce(&dyn ProgressIndicator) -> R) -> Option<R> {
        if self.is_silent() {
            return None;
        }

        let guard = self.progress.lock().ok()?;
        Some(f(guard.as_ref()))
    }

    pub fn operation(&self, operation: &str, context: &str) {
        let message = format!("{operation} {context}...");
        let _ = self.with_progress(|indicator| indicator.println(&message));
    }

    pub fn step(&self, message: &str) {
        let message = format!("  {message}");
        let _ = self.with_progress(|indicator| indicator.println(&message));
    }

    pub fn success(&self, message: &str) {
        let _ = self.with_progress(|indicator| indicator.success(message));
    }

    pub fn warning(&self, message: &str) {
        let message = format!("! {message}");
        let _ = self.with_progress(|indicator| indicator.println(&message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::{ProgressConfig, SilentProgress};
    use std::io;

    #[derive(Clone, Default)]
    struct RecordingIndicator {
        output: Arc<Mutex<Vec<String>>>,
    }

    impl ProgressIndicator for RecordingIndicator {
        fn start(&mut self, _config: ProgressConfig) {}

        fn update(&mut self, _current: u64, _total: Option<u64>) {}

        fn set_message(&mut self, _message: String) {}

        fn complete(&mut self, _message: Option<String>) {}

        fn error(&mut self, message: String) {
            self.output.lock().unwrap().push(format!("error:{message}"));
        }

        fn create_child(&mut self) -> Box<dyn ProgressIndicator> {
            Box::new(self.clone())
        }

        fn println(&self, message: &str) -> io::Result<()> {
            self.output.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn success(&self, message: &str) -> io::Result<()> {
            self.output.lock().unwrap().push(format!("success:{message}"));
            Ok(())
        }

        fn renderer_kind(&self) -> ProgressRendererKind {
            ProgressRendererKind::NonTty
        }
    }

    #[test]
    fn test_operation_step_and_outcome_lines() {
        let indicator = RecordingIndicator::default();
        let output = Arc::clone(&indicator.output);
        let reporter = StatusReporter::with_indicator(Box::new(indicator));

        reporter.operation("Checking", "for updates");
        reporter.step("ui 1.0 -> 1.1");
        reporter.warning("client must be installed manually");
        reporter.success("1 update installed");

        assert_eq!(
            *output.lock().unwrap(),
            vec![
                "Checking for updates...".to_string(),
                "  ui 1.0 -> 1.1".to_string(),
                "! client must be installed manually".to_string(),
                "success:1 update installed".to_string(),
            ]
        );
    }

    #[test]
    fn test_progress_handle_shares_indicator() {
        let indicator = RecordingIndicator::default();
        let output = Arc::clone(&indicator.output);
        let reporter = StatusReporter::with_indicator(Box::new(indicator));

        let _ = reporter.progress_handle().lock().unwrap().println("from-handle");

        assert_eq!(*output.lock().unwrap(), vec!["from-handle".to_string()]);
    }

    #[test]
    fn test_silent_indicator_suppresses_output() {
        let reporter = StatusReporter::with_indicator(Box::new(SilentProgress::new()));
        assert!(reporter.is_silent());
        reporter.operation("Checking", "for updates");
        reporter.success("done");
    }
}
