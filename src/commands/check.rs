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

use crate::commands::{build_scheduler, updates_table};
use crate::config::UpkeepConfig;
use crate::error::Result;
use crate::scheduler::{CheckOutcome, Scheduler};
use colored::Colorize;

pub struct CheckCommand {
    scheduler: Scheduler,
}

impl CheckCommand {
    pub fn new(config: &UpkeepConfig) -> Result<Self> {
        Ok(Self {
            scheduler: build_scheduler(config)?,
        })
    }

    pub fn execute(&self) -> Result<()> {
        match self.scheduler.check_now()? {
            CheckOutcome::AlreadyRunning => {
                println!("An update check is already running");
            }
            CheckOutcome::Disabled => {
                println!("Update checking is disabled");
                println!("Set 'enable = \"true\"' under [updater] in settings.toml to turn it on");
            }
            CheckOutcome::Completed { records, errors } => {
                for error in &errors {
                    eprintln!("{} {error}", "warning:".yellow().bold());
                }

                if records.is_empty() {
                    println!("All components are up to date");
                } else {
                    println!("{}", updates_table(&records));
                    println!("Run 'upkeep install --all' to install them");
                }
            }
        }
        Ok(())
    }
}
