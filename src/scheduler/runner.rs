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

use crate::error::{Result, UpkeepError};
use crate::scheduler::Scheduler;
use log::{debug, info};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

#[derive(Debug, Default)]
struct LoopState {
    stop: bool,
    triggered: bool,
}

#[derive(Debug, Default)]
struct Wakeup {
    state: Mutex<LoopState>,
    condvar: Condvar,
}

impl Wakeup {
    fn set(&self, apply: impl FnOnce(&mut LoopState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
        self.condvar.notify_all();
    }
}

/// Controls a scheduler thread started by [`Scheduler::spawn`].
///
/// Dropping the handle stops the thread and waits for it.
#[derive(Debug)]
pub struct SchedulerHandle {
    wakeup: Arc<Wakeup>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Run a cycle now instead of waiting for the timer.
    pub fn trigger(&self) {
        self.wakeup.set(|state| state.triggered = true);
    }

    pub fn stop(&self) {
        self.wakeup.set(|state| state.stop = true);
    }

    /// Stop the loop and wait for the current cycle to finish.
    pub fn join(mut self) -> Result<()> {
        self.stop();
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| UpkeepError::SystemError("Scheduler thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.stop();
            let _ = thread.join();
        }
    }
}

impl Scheduler {
    /// Start the periodic loop on its own thread.
    pub fn spawn(self: Arc<Self>) -> Result<SchedulerHandle> {
        let wakeup = Arc::new(Wakeup::default());
        let thread = thread::Builder::new()
            .name("upkeep-scheduler".to_string())
            .spawn({
                let wakeup = Arc::clone(&wakeup);
                move || self.run_loop(&wakeup)
            })
            .map_err(|e| UpkeepError::SystemError(format!("Failed to start scheduler: {e}")))?;

        Ok(SchedulerHandle {
            wakeup,
            thread: Some(thread),
        })
    }

    fn run_loop(&self, wakeup: &Wakeup) {
        info!("Update scheduler started");
        loop {
            let next = self.next_check_delay();
            debug!("Next update check in {}s", next.delay.as_secs());

            {
                let state = wakeup.state.lock().unwrap_or_else(PoisonError::into_inner);
                let (mut state, _) = wakeup
                    .condvar
                    .wait_timeout_while(state, next.delay, |state| {
                        !state.stop && !state.triggered
                    })
                    .unwrap_or_else(PoisonError::into_inner);
                if state.stop {
                    break;
                }
                state.triggered = false;
            }

            // Jobs keep running on their own threads.
            let jobs = self.run_once();
            if !jobs.is_empty() {
                debug!("Started {} background update(s)", jobs.len());
            }
        }
        info!("Update scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckReport, CheckStrategy, UpdateChannel};
    use crate::component::{Component, NoopHost, StaticRegistry};
    use crate::config::{ConfigStore, KEY_FREQUENCY, KEY_LASTCHECK, MemoryConfigStore, UPDATER_DOMAIN};
    use crate::scheduler::ManualClock;
    use crate::test::fixtures::{StubDownloader, plugin_component};
    use crate::update::InstallContext;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    const NOW: i64 = 1_700_000_000;

    #[derive(Default)]
    struct CountingStrategy {
        calls: AtomicUsize,
    }

    impl CheckStrategy for CountingStrategy {
        fn name(&self) -> &str {
            "counting"
        }

        fn check_for_updates(
            &self,
            _components: &[Arc<Component>],
            _channel: UpdateChannel,
        ) -> Result<CheckReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CheckReport::default())
        }
    }

    fn scheduler(last_check: i64, strategy: Arc<CountingStrategy>) -> Arc<Scheduler> {
        let store = MemoryConfigStore::new()
            .with_option(UPDATER_DOMAIN, KEY_LASTCHECK, &last_check.to_string())
            .with_option(UPDATER_DOMAIN, KEY_FREQUENCY, "3600");
        let registry = StaticRegistry::new(vec![plugin_component(
            "ui",
            "1.0",
            std::env::temp_dir().join("ui.jar"),
        )])
        .unwrap();
        let context = InstallContext {
            downloader: Arc::new(StubDownloader::failing()),
            host: Arc::new(NoopHost),
            download_dir: std::env::temp_dir(),
        };
        Arc::new(
            Scheduler::new(Arc::new(registry), Arc::new(store), context)
                .with_strategy(strategy)
                .with_clock(Arc::new(ManualClock::new(NOW))),
        )
    }

    fn wait_for(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_overdue_check_runs_promptly() {
        let strategy = Arc::new(CountingStrategy::default());
        let handle = scheduler(NOW - 7_200, strategy.clone()).spawn().unwrap();

        assert!(wait_for(|| strategy.calls.load(Ordering::SeqCst) >= 1));
        handle.join().unwrap();
    }

    #[test]
    fn test_trigger_runs_cycle_early_and_rearms() {
        let strategy = Arc::new(CountingStrategy::default());
        let scheduler = scheduler(NOW, strategy.clone());
        let handle = Arc::clone(&scheduler).spawn().unwrap();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 0);

        handle.trigger();
        assert!(wait_for(|| strategy.calls.load(Ordering::SeqCst) == 1));
        assert_eq!(
            scheduler.store.get_option(UPDATER_DOMAIN, KEY_LASTCHECK),
            Some(NOW.to_string())
        );
        assert_eq!(scheduler.next_check_delay().delay, Duration::from_secs(3600));

        handle.join().unwrap();
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_wakes_sleeping_loop() {
        let strategy = Arc::new(CountingStrategy::default());
        let handle = scheduler(NOW, strategy.clone()).spawn().unwrap();

        let started = Instant::now();
        handle.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 0);
    }
}
