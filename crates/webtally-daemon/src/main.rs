mod actors;
mod server;

use std::sync::Arc;

use actors::{NotifierActor, RulesActor, TrackerActor};
use anyhow::{Context, Result};
use server::{Server, ServerContext};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use webtally_adapters::{JsonRuleFile, SqliteUsageLedger, TomlSettingsStore};
use webtally_core::{Config, RuleInstaller, SettingsStore, UsageLedger};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("webtally_daemon=debug".parse()?),
        )
        .init();

    info!("webtally daemon starting");

    let config = Config::load().unwrap_or_else(|error| {
        warn!(%error, "failed to load config, using defaults");
        Config::default()
    });

    let (shutdown_sender, shutdown_receiver) = broadcast::channel::<()>(1);
    let sigint_shutdown_sender = shutdown_sender.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("SIGINT received, initiating shutdown");
        sigint_shutdown_sender.send(()).ok();
    });

    let (notifier_actor, notifier_handle) = NotifierActor::new(
        config.notifications.urgency.clone(),
        config.notifications.sound_enabled,
    );
    tokio::spawn(notifier_actor.run());

    let database_path = config.database_path();
    let ledger: Arc<dyn UsageLedger> = Arc::new(
        SqliteUsageLedger::new(&database_path).context("failed to open usage database")?,
    );
    info!(?database_path, "usage ledger opened");

    let settings_store: Arc<dyn SettingsStore> =
        Arc::new(TomlSettingsStore::new(config.settings_path()));
    let installer: Arc<dyn RuleInstaller> = Arc::new(JsonRuleFile::new(config.rules_path()));

    let (rules_actor, rules_handle) = RulesActor::new(
        ledger.clone(),
        settings_store.clone(),
        installer,
        Some(notifier_handle.clone()),
        config.refresh.clone(),
    );
    let rules_task = tokio::spawn(rules_actor.run(shutdown_sender.subscribe()));

    let (tracker_actor, tracker_handle) =
        TrackerActor::new(ledger.clone(), rules_handle.clone(), Some(notifier_handle));
    let tracker_task = tokio::spawn(tracker_actor.run(shutdown_sender.subscribe()));

    let server = Server::new(
        webtally_protocol::default_socket_path(),
        ServerContext {
            tracker: tracker_handle,
            rules: rules_handle,
            ledger,
            settings_store,
        },
    );
    let served = server.run(shutdown_receiver).await;

    shutdown_sender.send(()).ok();
    let _ = tracker_task.await;
    let _ = rules_task.await;

    info!("webtally daemon stopped");
    served
}
