use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use webtally_core::{ActivityTracker, IdleState, UsageDelta, UsageLedger};

use super::{NotifierHandle, RefreshReason, RulesHandle};

const PERSIST_ATTEMPTS: u32 = 3;
const PERSIST_RETRY_DELAY: Duration = Duration::from_millis(200);

pub enum TrackerMessage {
    FocusChanged {
        url: String,
    },
    IdleStateChanged {
        state: IdleState,
    },
    GetActiveDomain {
        reply: oneshot::Sender<Option<String>>,
    },
}

#[derive(Clone)]
pub struct TrackerHandle {
    sender: mpsc::Sender<TrackerMessage>,
}

impl TrackerHandle {
    pub async fn focus_changed(
        &self,
        url: String,
    ) -> Result<(), mpsc::error::SendError<TrackerMessage>> {
        self.sender.send(TrackerMessage::FocusChanged { url }).await
    }

    pub async fn idle_state_changed(
        &self,
        state: IdleState,
    ) -> Result<(), mpsc::error::SendError<TrackerMessage>> {
        self.sender
            .send(TrackerMessage::IdleStateChanged { state })
            .await
    }

    pub async fn active_domain(&self) -> Option<Option<String>> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::GetActiveDomain {
                reply: reply_sender,
            })
            .await
            .ok()?;
        reply_receiver.await.ok()
    }
}

/// Owns the focus interval. Events are applied in arrival order, and each
/// closed interval is persisted before the next event is looked at.
pub struct TrackerActor {
    receiver: mpsc::Receiver<TrackerMessage>,
    tracker: ActivityTracker,
    ledger: Arc<dyn UsageLedger>,
    rules: RulesHandle,
    notifier: Option<NotifierHandle>,
}

impl TrackerActor {
    pub fn new(
        ledger: Arc<dyn UsageLedger>,
        rules: RulesHandle,
        notifier: Option<NotifierHandle>,
    ) -> (Self, TrackerHandle) {
        let (sender, receiver) = mpsc::channel(64);

        let actor = Self {
            receiver,
            tracker: ActivityTracker::new(),
            ledger,
            rules,
            notifier,
        };

        let handle = TrackerHandle { sender };

        (actor, handle)
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!("tracker actor started");

        loop {
            tokio::select! {
                Some(message) = self.receiver.recv() => {
                    self.handle_message(message, Local::now()).await;
                }
                _ = shutdown.recv() => {
                    debug!("tracker actor shutdown");
                    break;
                }
                else => break,
            }
        }

        self.close_open_interval(Local::now()).await;
        debug!("tracker actor stopped");
    }

    async fn handle_message(&mut self, message: TrackerMessage, now: DateTime<Local>) {
        match message {
            TrackerMessage::FocusChanged { url } => {
                let deltas = self.tracker.focus_changed(&url, now);
                debug!(domain = ?self.tracker.active_domain(), "focus changed");
                self.apply(deltas, RefreshReason::FocusChanged).await;
            }
            TrackerMessage::IdleStateChanged { state } => {
                let deltas = self.tracker.idle_state_changed(state, now);
                debug!(%state, "idle state changed");
                self.apply(deltas, RefreshReason::IdleStateChanged).await;
            }
            TrackerMessage::GetActiveDomain { reply } => {
                let _ = reply.send(self.tracker.active_domain().map(str::to_string));
            }
        }
    }

    /// Daemon shutdown ends the interval like a screen lock would.
    async fn close_open_interval(&mut self, now: DateTime<Local>) {
        let deltas = self.tracker.idle_state_changed(IdleState::Locked, now);
        if deltas.is_empty() {
            return;
        }

        for delta in &deltas {
            self.persist(delta).await;
        }
        info!(entries = deltas.len(), "open interval flushed on shutdown");
    }

    async fn apply(&mut self, deltas: Vec<UsageDelta>, reason: RefreshReason) {
        let mut written = false;
        for delta in &deltas {
            written |= self.persist(delta).await;
        }

        let reason = if written {
            RefreshReason::LedgerWrite
        } else {
            reason
        };
        self.rules.state_changed(reason);
    }

    async fn persist(&self, delta: &UsageDelta) -> bool {
        for attempt in 1..=PERSIST_ATTEMPTS {
            match self.ledger.add(&delta.day, &delta.domain, delta.seconds) {
                Ok(()) => {
                    debug!(day = %delta.day, domain = %delta.domain, seconds = delta.seconds, "usage recorded");
                    return true;
                }
                Err(error) if attempt < PERSIST_ATTEMPTS => {
                    warn!(%error, attempt, "failed to record usage, retrying");
                    tokio::time::sleep(PERSIST_RETRY_DELAY).await;
                }
                Err(error) => {
                    error!(
                        %error,
                        day = %delta.day,
                        domain = %delta.domain,
                        seconds = delta.seconds,
                        "usage lost after retries"
                    );
                }
            }
        }

        if let Some(ref notifier) = self.notifier {
            notifier.send_persistence_failure(&delta.domain, delta.seconds);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::TimeZone;
    use webtally_adapters::{RecordingRuleInstaller, SqliteUsageLedger, TomlSettingsStore};
    use webtally_core::{
        DayKey, DayUsage, RefreshConfig, RuleInstaller, Settings, SettingsStore, UsageLedgerError,
    };

    use crate::actors::notifier::NotifierMessage;
    use crate::actors::RulesActor;

    struct FlakyLedger {
        inner: SqliteUsageLedger,
        failures_left: AtomicU32,
        attempts: AtomicU32,
    }

    impl FlakyLedger {
        fn failing(times: u32) -> Self {
            Self {
                inner: SqliteUsageLedger::in_memory().unwrap(),
                failures_left: AtomicU32::new(times),
                attempts: AtomicU32::new(0),
            }
        }
    }

    impl UsageLedger for FlakyLedger {
        fn add(&self, day: &DayKey, domain: &str, seconds: i64) -> Result<(), UsageLedgerError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(UsageLedgerError::Storage {
                    message: "database is locked".to_string(),
                });
            }
            self.inner.add(day, domain, seconds)
        }

        fn find_day(&self, day: &DayKey) -> Result<DayUsage, UsageLedgerError> {
            self.inner.find_day(day)
        }

        fn find_range(&self, days: &[DayKey]) -> Result<DayUsage, UsageLedgerError> {
            self.inner.find_range(days)
        }

        fn export_all(&self) -> Result<BTreeMap<DayKey, DayUsage>, UsageLedgerError> {
            self.inner.export_all()
        }

        fn clear_all(&self) -> Result<u32, UsageLedgerError> {
            self.inner.clear_all()
        }
    }

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 6, day, hour, minute, second)
            .single()
            .unwrap()
    }

    fn day(value: &str) -> DayKey {
        DayKey::parse(value).unwrap()
    }

    fn rules_handle(
        ledger: Arc<dyn UsageLedger>,
        directory: &tempfile::TempDir,
    ) -> RulesHandle {
        let (_actor, handle) = RulesActor::new(
            ledger,
            Arc::new(TomlSettingsStore::new(directory.path().join("settings.toml"))),
            Arc::new(RecordingRuleInstaller::new()),
            None,
            RefreshConfig::default(),
        );
        handle
    }

    fn tracker_with(
        ledger: Arc<dyn UsageLedger>,
        notifier: Option<NotifierHandle>,
        directory: &tempfile::TempDir,
    ) -> TrackerActor {
        let rules = rules_handle(ledger.clone(), directory);
        let (actor, _handle) = TrackerActor::new(ledger, rules, notifier);
        actor
    }

    #[tokio::test]
    async fn focus_switch_records_previous_domain() {
        let directory = tempfile::tempdir().unwrap();
        let ledger = Arc::new(SqliteUsageLedger::in_memory().unwrap());
        let mut actor = tracker_with(ledger.clone(), None, &directory);

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com/home".to_string(),
                },
                at(12, 10, 0, 0),
            )
            .await;
        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://y.com/".to_string(),
                },
                at(12, 10, 0, 30),
            )
            .await;

        let usage = ledger.find_day(&day("2024-06-12")).unwrap();
        assert_eq!(usage.seconds_for("x.com"), 30);
        assert_eq!(usage.seconds_for("y.com"), 0);
        assert_eq!(actor.tracker.active_domain(), Some("y.com"));
    }

    #[tokio::test]
    async fn lock_closes_interval_and_stops_tracking() {
        let directory = tempfile::tempdir().unwrap();
        let ledger = Arc::new(SqliteUsageLedger::in_memory().unwrap());
        let mut actor = tracker_with(ledger.clone(), None, &directory);

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com".to_string(),
                },
                at(12, 10, 0, 0),
            )
            .await;
        actor
            .handle_message(
                TrackerMessage::IdleStateChanged {
                    state: IdleState::Locked,
                },
                at(12, 10, 1, 0),
            )
            .await;
        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com".to_string(),
                },
                at(12, 11, 0, 0),
            )
            .await;

        let usage = ledger.find_day(&day("2024-06-12")).unwrap();
        assert_eq!(usage.seconds_for("x.com"), 60);
    }

    #[tokio::test]
    async fn midnight_crossing_is_split_between_days() {
        let directory = tempfile::tempdir().unwrap();
        let ledger = Arc::new(SqliteUsageLedger::in_memory().unwrap());
        let mut actor = tracker_with(ledger.clone(), None, &directory);

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com".to_string(),
                },
                at(12, 23, 59, 30),
            )
            .await;
        actor
            .handle_message(
                TrackerMessage::IdleStateChanged {
                    state: IdleState::Idle,
                },
                at(13, 0, 0, 30),
            )
            .await;

        assert_eq!(
            ledger.find_day(&day("2024-06-12")).unwrap().seconds_for("x.com"),
            30
        );
        assert_eq!(
            ledger.find_day(&day("2024-06-13")).unwrap().seconds_for("x.com"),
            30
        );
    }

    #[tokio::test]
    async fn ledger_write_over_limit_installs_block_rules() {
        let directory = tempfile::tempdir().unwrap();
        let ledger = Arc::new(SqliteUsageLedger::in_memory().unwrap());
        ledger.add(&DayKey::today(), "news.com", 59 * 60).unwrap();

        let settings_store = TomlSettingsStore::new(directory.path().join("settings.toml"));
        let mut settings = Settings {
            enable_limit: true,
            limit_minutes: 60,
            enable_block: true,
            ..Settings::default()
        };
        settings.set_focus_sites("a.com, b.com");
        settings_store.save(&settings).unwrap();

        let installer = Arc::new(RecordingRuleInstaller::new());
        let (rules_actor, rules) = RulesActor::new(
            ledger.clone(),
            Arc::new(settings_store),
            installer.clone(),
            None,
            RefreshConfig {
                refresh_interval_minutes: 60,
                startup_delay_seconds: 3600,
            },
        );
        let (_shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        tokio::spawn(rules_actor.run(shutdown_receiver));

        let (mut actor, _handle) = TrackerActor::new(ledger.clone(), rules, None);
        let now = Local::now();

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com".to_string(),
                },
                now - chrono::Duration::seconds(90),
            )
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(installer.installed().unwrap().is_empty());

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://y.com".to_string(),
                },
                now,
            )
            .await;

        let mut hosts = Vec::new();
        for _ in 0..50 {
            hosts = installer.installed().unwrap().hosts();
            if !hosts.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(hosts, vec!["a.com", "b.com"]);
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let directory = tempfile::tempdir().unwrap();
        let ledger = Arc::new(FlakyLedger::failing(2));
        let mut actor = tracker_with(ledger.clone(), None, &directory);

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com".to_string(),
                },
                at(12, 10, 0, 0),
            )
            .await;
        actor
            .handle_message(
                TrackerMessage::IdleStateChanged {
                    state: IdleState::Locked,
                },
                at(12, 10, 0, 45),
            )
            .await;

        assert_eq!(ledger.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(
            ledger.find_day(&day("2024-06-12")).unwrap().seconds_for("x.com"),
            45
        );
    }

    #[tokio::test]
    async fn persistent_failure_notifies_user() {
        let directory = tempfile::tempdir().unwrap();
        let ledger = Arc::new(FlakyLedger::failing(10));
        let (notifier, mut notifications) = NotifierHandle::channel();
        let mut actor = tracker_with(ledger.clone(), Some(notifier), &directory);

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com".to_string(),
                },
                at(12, 10, 0, 0),
            )
            .await;
        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://y.com".to_string(),
                },
                at(12, 10, 0, 20),
            )
            .await;

        let message = notifications.recv().await.unwrap();
        assert_eq!(
            message,
            NotifierMessage::PersistenceFailure {
                domain: "x.com".to_string(),
                seconds: 20,
            }
        );
        assert_eq!(ledger.attempts.load(Ordering::SeqCst), PERSIST_ATTEMPTS);
        assert_eq!(actor.tracker.active_domain(), Some("y.com"));
    }

    #[tokio::test]
    async fn shutdown_flushes_open_interval() {
        let directory = tempfile::tempdir().unwrap();
        let ledger = Arc::new(SqliteUsageLedger::in_memory().unwrap());
        let mut actor = tracker_with(ledger.clone(), None, &directory);

        actor
            .handle_message(
                TrackerMessage::FocusChanged {
                    url: "https://x.com".to_string(),
                },
                at(12, 10, 0, 0),
            )
            .await;
        actor.close_open_interval(at(12, 10, 5, 0)).await;

        assert_eq!(
            ledger.find_day(&day("2024-06-12")).unwrap().seconds_for("x.com"),
            300
        );
        assert_eq!(actor.tracker.active_domain(), None);
    }

    #[tokio::test]
    async fn handle_reports_active_domain() {
        let directory = tempfile::tempdir().unwrap();
        let ledger: Arc<dyn UsageLedger> = Arc::new(SqliteUsageLedger::in_memory().unwrap());
        let rules = rules_handle(ledger.clone(), &directory);
        let (actor, handle) = TrackerActor::new(ledger, rules, None);
        let (_shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        tokio::spawn(actor.run(shutdown_receiver));

        handle
            .focus_changed("https://www.example.com/page".to_string())
            .await
            .unwrap();

        assert_eq!(
            handle.active_domain().await,
            Some(Some("www.example.com".to_string()))
        );
    }
}
