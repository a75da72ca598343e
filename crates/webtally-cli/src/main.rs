mod client;
mod commands;
mod daemon_launcher;
mod storage;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use commands::{Period, SettingsUpdate};
use webtally_core::{IdleState, SortOrder};

#[derive(Parser)]
#[command(name = "webtally")]
#[command(about = "webtally - time spent per website, daily limits and focus blocking", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webtally daemon
    Start,
    /// Show what is being tracked and today's total
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report the URL of the active tab
    Visit {
        url: String,
    },
    /// Report an idle state change (active, idle, locked)
    Idle {
        state: String,
    },
    /// Show time per website
    Stats {
        /// Period: today, week or month
        #[arg(default_value = "today")]
        period: String,
        /// Ordering: time or name
        #[arg(long, default_value = "time")]
        sort: String,
    },
    /// Show or change the blocking settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// List the installed block rules
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the whole usage ledger as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Erase every recorded day
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set {
        #[arg(long)]
        enable_limit: Option<bool>,
        /// Daily limit in minutes (minimum 10)
        #[arg(long)]
        limit_minutes: Option<u32>,
        #[arg(long)]
        enable_block: Option<bool>,
        #[arg(long)]
        focus_mode: Option<bool>,
        /// Comma-separated hosts, e.g. "reddit.com, youtube.com"
        #[arg(long)]
        focus_sites: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => commands::start().await,
        Commands::Status { json } => commands::status(json).await,
        Commands::Visit { url } => commands::visit(url).await,
        Commands::Idle { state } => {
            let Some(idle_state) = IdleState::from_str(&state) else {
                bail!("invalid state '{}'. Valid states: active, idle, locked", state);
            };
            commands::idle(idle_state).await
        }
        Commands::Stats { period, sort } => {
            let Some(period_value) = Period::from_str(&period) else {
                bail!("invalid period '{}'. Valid periods: today, week, month", period);
            };
            let Some(order) = SortOrder::from_str(&sort) else {
                bail!("invalid sort '{}'. Valid orders: time, name", sort);
            };
            commands::stats(period_value, order).await
        }
        Commands::Settings { action } => match action {
            None | Some(SettingsAction::Show) => commands::settings_show(),
            Some(SettingsAction::Set {
                enable_limit,
                limit_minutes,
                enable_block,
                focus_mode,
                focus_sites,
            }) => {
                commands::settings_set(SettingsUpdate {
                    enable_limit,
                    limit_minutes,
                    enable_block,
                    focus_mode,
                    focus_sites,
                })
                .await
            }
        },
        Commands::Rules { json } => commands::rules(json).await,
        Commands::Export { output } => commands::export(output).await,
        Commands::Clear { yes } => commands::clear(yes).await,
    }
}
