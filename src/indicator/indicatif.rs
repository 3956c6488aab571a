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

use crate::indicator::{ProgressConfig, ProgressIndicator, ProgressRendererKind, ProgressStyle};
use indicatif::{MultiProgress, ProgressBar};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Animated bars and spinners for interactive terminals.
pub struct IndicatifProgress {
    progress_bar: Option<ProgressBar>,
    multi_progress: Arc<MultiProgress>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::new_with_parent(Arc::new(MultiProgress::new()))
    }

    fn new_with_parent(multi_progress: Arc<MultiProgress>) -> Self {
        Self {
            progress_bar: None,
            multi_progress,
        }
    }

    fn create_template(&self, config: &ProgressConfig) -> &'static str {
        match (&config.total, &config.style) {
            (Some(_), ProgressStyle::Percent) => {
                "{spinner:.green} {prefix} [{bar:30.cyan/blue}] {percent:>3}% {msg}"
            }
            (Some(_), ProgressStyle::Count) => {
                "{spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}"
            }
            (None, _) => "{spinner:.green} {prefix} {msg}",
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressIndicator for IndicatifProgress {
    fn start(&mut self, config: ProgressConfig) {
        let prefix = format!("{} {}", config.operation, config.context);

        let pb = match config.total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };

        let style = indicatif::ProgressStyle::default_bar()
            .template(self.create_template(&config))
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
            .progress_chars("█▓░")
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷");
        pb.set_style(style);
        pb.set_prefix(prefix);
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(self.multi_progress.add(pb));
    }

    fn update(&mut self, current: u64, total: Option<u64>) {
        if let Some(pb) = &self.progress_bar {
            if let Some(total) = total {
                pb.set_length(total);
            }
            pb.set_position(current);
        }
    }

    fn set_message(&mut self, message: String) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(message);
        }
    }

    fn complete(&mut self, message: Option<String>) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(message.unwrap_or_else(|| "Complete".to_string()));
        }
    }

    fn error(&mut self, message: String) {
        if let Some(pb) = &self.progress_bar {
            pb.abandon_with_message(format!("✗ {message}"));
        }
    }

    fn create_child(&mut self) -> Box<dyn ProgressIndicator> {
        Box::new(IndicatifProgress::new_with_parent(Arc::clone(
            &self.multi_progress,
        )))
    }

    fn println(&self, message: &str) -> io::Result<()> {
        self.multi_progress.println(message)
    }

    fn renderer_kind(&self) -> ProgressRendererKind {
        ProgressRendererKind::Tty
    }
}
