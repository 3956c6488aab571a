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

use crate::commands::build_scheduler;
use crate::config::UpkeepConfig;
use crate::error::Result;
use crate::scheduler::{ShutdownToken, signal_token};
use log::info;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runs the periodic scheduler in the foreground until interrupted.
pub struct RunCommand<'a> {
    config: &'a UpkeepConfig,
}

impl<'a> RunCommand<'a> {
    pub fn new(config: &'a UpkeepConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<()> {
        self.execute_until(&signal_token())
    }

    pub fn execute_until(&self, shutdown: &ShutdownToken) -> Result<()> {
        let scheduler = Arc::new(build_scheduler(self.config)?);
        let settings = scheduler.settings();

        println!(
            "Checking for updates every {}s on the {} channel. Press Ctrl-C to stop.",
            settings.frequency, settings.channel
        );
        let handle = Arc::clone(&scheduler).spawn()?;

        while !shutdown.is_requested() {
            thread::sleep(SHUTDOWN_POLL_INTERVAL);
        }

        info!("Shutdown requested, stopping scheduler");
        handle.join()
    }
}
