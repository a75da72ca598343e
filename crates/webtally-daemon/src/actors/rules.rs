use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use webtally_core::{
    compute_block_list, BlockRuleSet, DayKey, RefreshConfig, RuleInstaller, Settings,
    SettingsStore, UsageLedger, LIMIT_REACHED_NOTIFICATION_ID,
};

use super::NotifierHandle;

const LIMIT_REACHED_TITLE: &str = "Daily limit reached";
const LIMIT_REACHED_BODY: &str = "Take a break. Focus mode will block distracting sites.";

/// Why a recomputation was requested. Only used for diagnostics: every pass
/// re-reads all of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Periodic,
    FocusChanged,
    IdleStateChanged,
    LedgerWrite,
    LedgerCleared,
    SettingsChanged,
}

pub enum RulesMessage {
    Refresh {
        reason: RefreshReason,
        reply: Option<oneshot::Sender<BlockRuleSet>>,
    },
    GetInstalled {
        reply: oneshot::Sender<BlockRuleSet>,
    },
}

#[derive(Clone)]
pub struct RulesHandle {
    sender: mpsc::Sender<RulesMessage>,
}

impl RulesHandle {
    /// Hook for every ledger or settings mutation and every tracker event.
    pub fn state_changed(&self, reason: RefreshReason) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Err(error) = sender
                .send(RulesMessage::Refresh {
                    reason,
                    reply: None,
                })
                .await
            {
                error!(%error, "failed to send refresh message to rules actor");
            }
        });
    }

    /// Recomputes and waits for the resulting installed set.
    pub async fn refresh(&self, reason: RefreshReason) -> Option<BlockRuleSet> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.sender
            .send(RulesMessage::Refresh {
                reason,
                reply: Some(reply_sender),
            })
            .await
            .ok()?;
        reply_receiver.await.ok()
    }

    pub async fn installed(&self) -> Option<BlockRuleSet> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.sender
            .send(RulesMessage::GetInstalled {
                reply: reply_sender,
            })
            .await
            .ok()?;
        reply_receiver.await.ok()
    }
}

/// Sole owner of recomputation. Passes run one at a time, so the installed
/// rule set always matches the most recent completed computation.
pub struct RulesActor {
    receiver: mpsc::Receiver<RulesMessage>,
    ledger: Arc<dyn UsageLedger>,
    settings_store: Arc<dyn SettingsStore>,
    installer: Arc<dyn RuleInstaller>,
    notifier: Option<NotifierHandle>,
    refresh_config: RefreshConfig,
    installed: BlockRuleSet,
    shown_notifications: HashSet<&'static str>,
}

impl RulesActor {
    pub fn new(
        ledger: Arc<dyn UsageLedger>,
        settings_store: Arc<dyn SettingsStore>,
        installer: Arc<dyn RuleInstaller>,
        notifier: Option<NotifierHandle>,
        refresh_config: RefreshConfig,
    ) -> (Self, RulesHandle) {
        let (sender, receiver) = mpsc::channel(64);

        let installed = installer.installed().unwrap_or_else(|error| {
            warn!(%error, "failed to read installed rules, assuming none");
            BlockRuleSet::empty()
        });

        let actor = Self {
            receiver,
            ledger,
            settings_store,
            installer,
            notifier,
            refresh_config,
            installed,
            shown_notifications: HashSet::new(),
        };

        let handle = RulesHandle { sender };

        (actor, handle)
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!("rules actor started");

        let startup_delay = Duration::from_secs(self.refresh_config.startup_delay_seconds);
        let period = Duration::from_secs(self.refresh_config.refresh_interval_minutes.max(1) * 60);
        let mut ticker = interval_at(Instant::now() + startup_delay, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(message) = self.receiver.recv() => {
                    self.handle_message(message);
                }
                _ = ticker.tick() => {
                    self.recompute(RefreshReason::Periodic);
                }
                _ = shutdown.recv() => {
                    debug!("rules actor shutdown");
                    break;
                }
                else => break,
            }
        }

        debug!("rules actor stopped");
    }

    fn handle_message(&mut self, message: RulesMessage) {
        match message {
            RulesMessage::Refresh { reason, reply } => {
                self.recompute(reason);
                if let Some(reply) = reply {
                    let _ = reply.send(self.installed.clone());
                }
            }
            RulesMessage::GetInstalled { reply } => {
                let _ = reply.send(self.installed.clone());
            }
        }
    }

    fn recompute(&mut self, reason: RefreshReason) {
        let (settings, settings_loaded) = match self.settings_store.load() {
            Ok(settings) => (settings, true),
            Err(error) => {
                warn!(%error, "failed to load settings, using defaults");
                (Settings::default(), false)
            }
        };

        let today = DayKey::today();
        let usage = match self.ledger.find_day(&today) {
            Ok(usage) => usage,
            Err(error) => {
                warn!(%error, ?reason, "failed to read today's usage, keeping current rules");
                return;
            }
        };

        let decision = compute_block_list(usage.total_minutes(), &settings);
        self.update_limit_notification(decision.limit_reached, settings_loaded);

        let rules = decision.rules();
        if rules == self.installed {
            debug!(?reason, rules = rules.len(), "block rules unchanged");
            return;
        }

        match self.installer.replace_all(&rules) {
            Ok(()) => {
                info!(?reason, hosts = ?rules.hosts(), "block rules installed");
                self.installed = rules;
            }
            Err(error) => {
                error!(%error, ?reason, "failed to install block rules, previous rules kept");
            }
        }
    }

    /// Shows the limit notification once per episode; the episode ends when a pass
    /// using the stored settings finds the limit no longer reached. Default settings
    /// from a failed read never end it.
    fn update_limit_notification(&mut self, limit_reached: bool, settings_loaded: bool) {
        if !limit_reached {
            if settings_loaded {
                self.shown_notifications.remove(LIMIT_REACHED_NOTIFICATION_ID);
            }
            return;
        }

        if !self.shown_notifications.insert(LIMIT_REACHED_NOTIFICATION_ID) {
            return;
        }

        if let Some(ref notifier) = self.notifier {
            notifier.show(
                LIMIT_REACHED_NOTIFICATION_ID,
                LIMIT_REACHED_TITLE,
                LIMIT_REACHED_BODY,
            );
        }
        info!("daily limit reached");
    }
}
