use anyhow::{Context, Result};
use webtally_core::{Settings, SettingsStore};
use webtally_protocol::{Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::storage::settings_store;

const MINIMUM_LIMIT_MINUTES: u32 = 10;

/// Fields the user asked to change; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct SettingsUpdate {
    pub enable_limit: Option<bool>,
    pub limit_minutes: Option<u32>,
    pub enable_block: Option<bool>,
    pub focus_mode: Option<bool>,
    pub focus_sites: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.enable_limit.is_none()
            && self.limit_minutes.is_none()
            && self.enable_block.is_none()
            && self.focus_mode.is_none()
            && self.focus_sites.is_none()
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(enable_limit) = self.enable_limit {
            settings.enable_limit = enable_limit;
        }
        if let Some(limit_minutes) = self.limit_minutes {
            settings.limit_minutes = limit_minutes.max(MINIMUM_LIMIT_MINUTES);
        }
        if let Some(enable_block) = self.enable_block {
            settings.enable_block = enable_block;
        }
        if let Some(focus_mode) = self.focus_mode {
            settings.focus_mode = focus_mode;
        }
        if let Some(ref focus_sites) = self.focus_sites {
            settings.set_focus_sites(focus_sites);
        }
    }
}

pub fn show() -> Result<()> {
    let store = settings_store();
    let settings = store.load().context("failed to read settings")?;

    println!("Settings ({})", store.path().display());
    print_settings(&settings);

    Ok(())
}

pub async fn set(update: SettingsUpdate) -> Result<()> {
    if update.is_empty() {
        return show();
    }

    let store = settings_store();
    let mut settings = store.load().context("failed to read settings")?;
    update.apply(&mut settings);
    store.save(&settings).context("failed to save settings")?;

    if let Some(requested) = update.limit_minutes {
        if requested < MINIMUM_LIMIT_MINUTES {
            println!(
                "Daily limit raised to the minimum of {} min",
                MINIMUM_LIMIT_MINUTES
            );
        }
    }

    println!("Settings saved");
    print_settings(&settings);

    notify_daemon().await;

    Ok(())
}

async fn notify_daemon() {
    let client = DaemonClient::new();

    match client.send(Request::SettingsChanged).await {
        Ok(Response::Ok) => {}
        Ok(Response::Error { message }) => eprintln!("Daemon error: {}", message),
        Ok(_) => eprintln!("Unexpected response from the daemon"),
        Err(ClientError::DaemonNotRunning) => {
            println!("The daemon is not running; the new settings apply when it starts");
        }
        Err(error) => eprintln!("Could not reach the daemon: {}", error),
    }
}

fn print_settings(settings: &Settings) {
    println!("   enable_limit   {}", settings.enable_limit);
    println!("   limit_minutes  {}", settings.limit_minutes);
    println!("   enable_block   {}", settings.enable_block);
    println!("   focus_mode     {}", settings.focus_mode);
    println!("   focus_sites    {}", settings.focus_sites_display());
}
