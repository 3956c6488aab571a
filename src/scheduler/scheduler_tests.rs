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

use super::*;
use crate::check::{CheckReport, ConfigComponentPolicy};
use crate::component::{NoopHost, StaticRegistry};
use crate::config::{
    KEY_AUTODOWNLOAD, KEY_AUTOUPDATE, KEY_ENABLE, KEY_FREQUENCY, MemoryConfigStore,
};
use crate::test::fixtures::{StubDownloader, client_component, plugin_component, zip_bytes};
use crate::version::Version;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const NOW: i64 = 1_700_000_000;
const DAY: i64 = 86_400;

/// Reports whatever versions it is told to, for the components it is asked about.
#[derive(Default)]
struct ScriptedStrategy {
    offers: Mutex<Vec<(String, String)>>,
    current: Mutex<Vec<String>>,
    asked: Mutex<Vec<Vec<String>>>,
    calls: AtomicUsize,
}

impl ScriptedStrategy {
    fn offering(offers: &[(&str, &str)]) -> Arc<Self> {
        let strategy = Self::default();
        strategy.set(offers);
        Arc::new(strategy)
    }

    fn set(&self, offers: &[(&str, &str)]) {
        *self.offers.lock().unwrap() = offers
            .iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect();
    }

    fn set_current(&self, names: &[&str]) {
        *self.current.lock().unwrap() = names.iter().map(|name| name.to_string()).collect();
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CheckStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn check_for_updates(
        &self,
        components: &[Arc<Component>],
        _channel: UpdateChannel,
    ) -> Result<CheckReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.asked
            .lock()
            .unwrap()
            .push(components.iter().map(|c| c.name().to_string()).collect());

        let offers = self.offers.lock().unwrap();
        let results = components
            .iter()
            .filter_map(|component| {
                offers
                    .iter()
                    .find(|(name, _)| name == component.name())
                    .map(|(name, version)| CheckResult {
                        component: Arc::clone(component),
                        remote_version: Version::new(version),
                        url: format!("http://updates.test/{name}.zip"),
                        channel: UpdateChannel::Stable,
                    })
            })
            .collect();
        Ok(CheckReport {
            results,
            up_to_date: self.current.lock().unwrap().clone(),
            errors: Vec::new(),
        })
    }
}

/// Signals when a check starts, then blocks until released.
struct BlockingStrategy {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
    calls: AtomicUsize,
}

impl CheckStrategy for BlockingStrategy {
    fn name(&self) -> &str {
        "blocking"
    }

    fn check_for_updates(
        &self,
        _components: &[Arc<Component>],
        _channel: UpdateChannel,
    ) -> Result<CheckReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.lock().unwrap().send(()).unwrap();
        self.release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        Ok(CheckReport::default())
    }
}

struct FailingStrategy;

impl CheckStrategy for FailingStrategy {
    fn name(&self) -> &str {
        "failing"
    }

    fn check_for_updates(
        &self,
        _components: &[Arc<Component>],
        _channel: UpdateChannel,
    ) -> Result<CheckReport> {
        Err(UpkeepError::NetworkError("connection refused".to_string()))
    }
}

struct Fixture {
    temp_dir: TempDir,
    store: Arc<MemoryConfigStore>,
    clock: Arc<ManualClock>,
}

impl Fixture {
    fn new(store: MemoryConfigStore) -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            store: Arc::new(store),
            clock: Arc::new(ManualClock::new(NOW)),
        }
    }

    fn plugin(&self, name: &str) -> Component {
        plugin_component(name, "1.0", self.temp_dir.path().join(format!("{name}.jar")))
    }

    fn scheduler(&self, components: Vec<Component>, downloader: StubDownloader) -> Scheduler {
        let context = InstallContext {
            downloader: Arc::new(downloader),
            host: Arc::new(NoopHost),
            download_dir: self.temp_dir.path().join("downloads"),
        };
        Scheduler::new(
            Arc::new(StaticRegistry::new(components).unwrap()),
            self.store.clone(),
            context,
        )
        .with_clock(self.clock.clone())
    }

    fn last_check(&self) -> Option<String> {
        self.store.get_option(UPDATER_DOMAIN, KEY_LASTCHECK)
    }
}

fn completed(outcome: CheckOutcome) -> (Vec<UpdateRecord>, Vec<UpkeepError>) {
    match outcome {
        CheckOutcome::Completed { records, errors } => (records, errors),
        other => panic!("expected a completed check, got {other:?}"),
    }
}

#[test]
fn test_check_creates_pending_records_and_persists_lastcheck() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui"), fixture.plugin("dcc")], StubDownloader::failing())
        .with_strategy(strategy.clone());

    let (records, errors) = completed(scheduler.check_now().unwrap());

    assert!(errors.is_empty());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].component().name(), "ui");
    assert_eq!(records[0].status(), UpdateStatus::Pending);
    assert!(records[0].ptr_eq(&scheduler.record("ui").unwrap()));
    assert!(scheduler.record("dcc").is_none());
    assert_eq!(fixture.last_check(), Some(NOW.to_string()));
}

#[test]
fn test_concurrent_checks_make_one_remote_request() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let strategy = Arc::new(BlockingStrategy {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
        calls: AtomicUsize::new(0),
    });
    let scheduler = Arc::new(
        fixture
            .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
            .with_strategy(strategy.clone()),
    );

    let first = {
        let scheduler = Arc::clone(&scheduler);
        thread::spawn(move || scheduler.check_now().unwrap())
    };
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let second = scheduler.check_now().unwrap();
    assert!(matches!(second, CheckOutcome::AlreadyRunning));
    // A skipped duplicate has no side effects.
    assert_eq!(fixture.last_check(), None);

    release_tx.send(()).unwrap();
    let first = first.join().unwrap();
    assert!(matches!(first, CheckOutcome::Completed { .. }));
    assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
    assert_eq!(fixture.last_check(), Some(NOW.to_string()));
}

#[test]
fn test_disabled_skips_remote_call_but_records_time() {
    let fixture = Fixture::new(MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_ENABLE, "false"));
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
        .with_strategy(strategy.clone());

    let outcome = scheduler.check_now().unwrap();

    assert!(matches!(outcome, CheckOutcome::Disabled));
    assert_eq!(strategy.calls(), 0);
    assert_eq!(fixture.last_check(), Some(NOW.to_string()));
    assert!(scheduler.pending().is_empty());
}

#[test]
fn test_failed_strategy_still_records_time() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
        .with_strategy(Arc::new(FailingStrategy))
        .with_strategy(ScriptedStrategy::offering(&[("ui", "2.0")]));

    let (records, errors) = completed(scheduler.check_now().unwrap());

    assert_eq!(records.len(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(fixture.last_check(), Some(NOW.to_string()));
}

#[test]
fn test_strategies_are_consolidated() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.1")]))
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.3")]))
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.2")]));

    let (records, _) = completed(scheduler.check_now().unwrap());

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].remote_version().to_string(), "1.3");
}

#[test]
fn test_policy_excludes_disabled_components() {
    let store = Arc::new(MemoryConfigStore::new().with_option(UPDATER_DOMAIN, "enable-dcc", "false"));
    let fixture = Fixture::new(MemoryConfigStore::new());
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1"), ("dcc", "1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui"), fixture.plugin("dcc")], StubDownloader::failing())
        .with_policy(Arc::new(ConfigComponentPolicy::new(store)))
        .with_strategy(strategy.clone());

    let (records, _) = completed(scheduler.check_now().unwrap());

    assert_eq!(records.len(), 1);
    assert_eq!(*strategy.asked.lock().unwrap(), vec![vec!["ui".to_string()]]);
}

#[test]
fn test_same_version_keeps_existing_record() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
        .with_strategy(strategy.clone());

    let (first, _) = completed(scheduler.check_now().unwrap());
    let (second, _) = completed(scheduler.check_now().unwrap());

    assert!(first[0].ptr_eq(&second[0]));
    assert_eq!(scheduler.pending().len(), 1);
}

#[test]
fn test_newer_version_supersedes_pending_record() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
        .with_strategy(strategy.clone());

    let (first, _) = completed(scheduler.check_now().unwrap());
    strategy.set(&[("ui", "1.2")]);
    let (second, _) = completed(scheduler.check_now().unwrap());

    assert!(!first[0].ptr_eq(&second[0]));
    assert_eq!(
        scheduler.record("ui").unwrap().remote_version().to_string(),
        "1.2"
    );
}

#[test]
fn test_failed_record_is_replaced_by_fresh_one() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
        .with_strategy(strategy.clone());

    let (first, _) = completed(scheduler.check_now().unwrap());
    assert_eq!(first[0].start_install().unwrap().wait(), UpdateStatus::Error);

    let (second, _) = completed(scheduler.check_now().unwrap());

    assert!(!first[0].ptr_eq(&second[0]));
    assert_eq!(second[0].status(), UpdateStatus::Pending);
}

#[test]
fn test_remove_discards_record() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::failing())
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.1")]));

    scheduler.check_now().unwrap();
    assert!(scheduler.remove("ui").is_some());
    assert!(scheduler.pending().is_empty());
    assert!(scheduler.remove("ui").is_none());
}

#[test]
fn test_up_to_date_report_drops_pending_record() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1"), ("dcc", "1.1")]);
    let scheduler = fixture
        .scheduler(
            vec![fixture.plugin("ui"), fixture.plugin("dcc")],
            StubDownloader::failing(),
        )
        .with_strategy(strategy.clone());

    scheduler.check_now().unwrap();
    strategy.set(&[]);
    strategy.set_current(&["ui"]);
    let (records, _) = completed(scheduler.check_now().unwrap());

    assert!(records.is_empty());
    assert!(scheduler.record("ui").is_none());
    assert!(scheduler.record("dcc").is_some());
}

#[test]
fn test_superseded_download_is_deleted() {
    let fixture = Fixture::new(
        MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_AUTODOWNLOAD, "true"),
    );
    let strategy = ScriptedStrategy::offering(&[("ui", "1.1")]);
    let payload = zip_bytes(&[("plugin.config", b"version=1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::serving(payload))
        .with_strategy(strategy.clone());

    let jobs = scheduler.run_once();
    let old = jobs[0].record().clone();
    for job in jobs {
        job.wait();
    }
    let old_artifact = old.artifact_path().unwrap();
    assert!(old_artifact.exists());

    strategy.set(&[("ui", "1.2")]);
    scheduler.check_now().unwrap();

    assert!(!old_artifact.exists());
    assert!(old.artifact_path().is_none());
    assert_eq!(
        scheduler.record("ui").unwrap().remote_version().to_string(),
        "1.2"
    );
}

#[test]
fn test_remove_deletes_downloaded_artifact() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let payload = zip_bytes(&[("plugin.config", b"version=1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::serving(payload))
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.1")]));

    let (records, _) = completed(scheduler.check_now().unwrap());
    assert_eq!(records[0].start_download().unwrap().wait(), UpdateStatus::Downloaded);
    let artifact = records[0].artifact_path().unwrap();

    scheduler.remove("ui").unwrap();

    assert!(!artifact.exists());
}

#[test]
fn test_next_check_delay_clamps_overdue_schedule() {
    let fixture = Fixture::new(
        MemoryConfigStore::new()
            .with_option(UPDATER_DOMAIN, KEY_LASTCHECK, &(NOW - DAY - 100).to_string())
            .with_option(UPDATER_DOMAIN, KEY_FREQUENCY, &DAY.to_string()),
    );
    let scheduler = fixture.scheduler(vec![fixture.plugin("ui")], StubDownloader::failing());

    let next = scheduler.next_check_delay();
    assert_eq!(next.delay, MIN_CHECK_DELAY);
    assert!(next.clamped);

    scheduler.check_now().unwrap();
    fixture.clock.advance(60);

    let next = scheduler.next_check_delay();
    assert_eq!(next.delay, Duration::from_secs((DAY - 60) as u64));
    assert!(!next.clamped);
}

#[test]
fn test_without_auto_flags_nothing_starts() {
    let fixture = Fixture::new(MemoryConfigStore::new());
    let downloader = StubDownloader::failing();
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], downloader)
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.1")]));

    let jobs = scheduler.run_once();

    assert!(jobs.is_empty());
    assert_eq!(scheduler.record("ui").unwrap().status(), UpdateStatus::Pending);
}

#[test]
fn test_autoupdate_installs_pending_records() {
    let fixture = Fixture::new(MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_AUTOUPDATE, "true"));
    let payload = zip_bytes(&[("plugin.config", b"version=1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::serving(payload))
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.1")]));

    let jobs = scheduler.run_once();

    assert_eq!(jobs.len(), 1);
    let statuses: Vec<UpdateStatus> = jobs.into_iter().map(InstallJob::wait).collect();
    assert_eq!(statuses, vec![UpdateStatus::Installed]);
    assert!(fixture.temp_dir.path().join("ui.jar").exists());
}

#[test]
fn test_autodownload_stops_at_downloaded() {
    let fixture = Fixture::new(MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_AUTODOWNLOAD, "true"));
    let payload = zip_bytes(&[("plugin.config", b"version=1.1")]);
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::serving(payload))
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.1")]));

    let jobs = scheduler.run_once();

    let statuses: Vec<UpdateStatus> = jobs.into_iter().map(InstallJob::wait).collect();
    assert_eq!(statuses, vec![UpdateStatus::Downloaded]);
    assert!(!fixture.temp_dir.path().join("ui.jar").exists());
}

#[test]
fn test_autoupdate_only_downloads_manual_components() {
    let fixture = Fixture::new(MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_AUTOUPDATE, "true"));
    let target = fixture.temp_dir.path().join("client.jar");
    let scheduler = fixture
        .scheduler(
            vec![client_component("0.5.1", target.clone(), false)],
            StubDownloader::serving(b"client".to_vec()),
        )
        .with_strategy(ScriptedStrategy::offering(&[("client", "0.6.0")]));

    let jobs = scheduler.run_once();

    let statuses: Vec<UpdateStatus> = jobs.into_iter().map(InstallJob::wait).collect();
    assert_eq!(statuses, vec![UpdateStatus::Downloaded]);
    assert!(!target.exists());
}

#[test]
fn test_in_progress_records_are_not_restarted() {
    let fixture = Fixture::new(MemoryConfigStore::new().with_option(UPDATER_DOMAIN, KEY_AUTODOWNLOAD, "true"));
    let scheduler = fixture
        .scheduler(vec![fixture.plugin("ui")], StubDownloader::serving(b"x".to_vec()))
        .with_strategy(ScriptedStrategy::offering(&[("ui", "1.1")]));

    let first: Vec<UpdateStatus> = scheduler.run_once().into_iter().map(InstallJob::wait).collect();
    let second = scheduler.run_once();

    assert_eq!(first, vec![UpdateStatus::Downloaded]);
    assert!(second.is_empty());
}
