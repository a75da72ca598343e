use anyhow::{bail, Result};
use webtally_core::{
    limit_progress_percent, DayKey, DayUsage, SettingsStore, SortOrder, UsageLedger, UsageReport,
};
use webtally_protocol::{Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::storage::{open_ledger, settings_store};

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
}

impl Period {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "today" => Some(Period::Today),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "Last 7 days",
            Period::Month => "This month",
        }
    }

    fn days(&self, today: DayKey) -> Vec<DayKey> {
        match self {
            Period::Today => vec![today],
            Period::Week => DayKey::last_days(7, today),
            Period::Month => DayKey::month_of(today),
        }
    }
}

pub async fn execute(period: Period, order: SortOrder) -> Result<()> {
    let days = period.days(DayKey::today());
    let usage = fetch_usage(&days).await?;
    let report = UsageReport::build(&usage, order);

    if report.is_empty() {
        println!("{}: no browsing time recorded", period.label());
        return Ok(());
    }

    println!("{}: {:.1} min", period.label(), report.total_minutes());
    for line in render_entries(&report) {
        println!("   {}", line);
    }

    if period == Period::Today {
        let settings = settings_store().load().unwrap_or_default();
        if settings.enable_limit {
            let percent = limit_progress_percent(
                report.total_minutes(),
                settings.limit_minutes,
                settings.enable_limit,
            );
            println!();
            println!(
                "Daily limit: {} min, {}% used",
                settings.limit_minutes, percent
            );
        }
    }

    Ok(())
}

/// Totals from the daemon, or straight from the database when the daemon is down.
async fn fetch_usage(days: &[DayKey]) -> Result<DayUsage> {
    let client = DaemonClient::new();
    let request = Request::GetUsage {
        days: days.iter().map(DayKey::to_string).collect(),
    };

    match client.send(request).await {
        Ok(Response::Usage { totals }) => Ok(totals.into_iter().collect()),
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("unexpected response from the daemon"),
        Err(ClientError::DaemonNotRunning) => {
            let ledger = open_ledger()?;
            ledger
                .find_range(days)
                .map_err(|error| anyhow::anyhow!("read error: {}", error))
        }
        Err(error) => bail!("{}", error),
    }
}

fn render_entries(report: &UsageReport) -> Vec<String> {
    let largest = report
        .entries
        .iter()
        .map(|entry| entry.seconds)
        .max()
        .unwrap_or(0);
    let label_width = report
        .entries
        .iter()
        .map(|entry| entry.label.len())
        .max()
        .unwrap_or(0);

    report
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{:<label_width$}  {:>7.1} min  {}",
                entry.label,
                entry.minutes(),
                bar(entry.seconds, largest),
                label_width = label_width,
            )
        })
        .collect()
}

fn bar(seconds: i64, largest: i64) -> String {
    if largest <= 0 {
        return String::new();
    }
    let filled = ((seconds as f64 / largest as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled.min(BAR_WIDTH))
}
