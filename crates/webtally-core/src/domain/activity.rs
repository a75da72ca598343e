use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{extract_domain, DayKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleState {
    Active,
    Idle,
    Locked,
}

impl IdleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdleState::Active => "active",
            IdleState::Idle => "idle",
            IdleState::Locked => "locked",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "active" => Some(IdleState::Active),
            "idle" => Some(IdleState::Idle),
            "locked" => Some(IdleState::Locked),
            _ => None,
        }
    }

    /// Idle and locked periods never accumulate time.
    pub fn suspends_tracking(&self) -> bool {
        matches!(self, IdleState::Idle | IdleState::Locked)
    }
}

impl std::fmt::Display for IdleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One increment for the usage ledger, produced when a focus interval closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageDelta {
    pub day: DayKey,
    pub domain: String,
    pub seconds: i64,
}

/// Attributes wall-clock time to the domain of the foreground tab.
///
/// Holds at most one open interval. Every transition closes the previous interval
/// and returns the increments it produced; persisting them is up to the caller.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    active_domain: Option<String>,
    focus_started_at: Option<DateTime<Local>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_domain(&self) -> Option<&str> {
        self.active_domain.as_deref()
    }

    pub fn focus_started_at(&self) -> Option<DateTime<Local>> {
        self.focus_started_at
    }

    /// The active tab's URL became known (tab switch or navigation in the active tab).
    ///
    /// An unrepresentable URL still opens an interval, but one that never produces
    /// ledger writes.
    pub fn focus_changed(&mut self, url: &str, now: DateTime<Local>) -> Vec<UsageDelta> {
        let deltas = self.close_interval(now);

        self.active_domain = extract_domain(url);
        self.focus_started_at = Some(now);

        deltas
    }

    pub fn idle_state_changed(&mut self, state: IdleState, now: DateTime<Local>) -> Vec<UsageDelta> {
        if !state.suspends_tracking() {
            return Vec::new();
        }

        let deltas = self.close_interval(now);

        self.active_domain = None;
        self.focus_started_at = None;

        deltas
    }

    fn close_interval(&self, now: DateTime<Local>) -> Vec<UsageDelta> {
        let (Some(domain), Some(started_at)) = (&self.active_domain, self.focus_started_at) else {
            return Vec::new();
        };

        let elapsed = now.signed_duration_since(started_at).num_seconds();
        if elapsed <= 0 {
            return Vec::new();
        }

        split_by_day(domain, started_at, now, elapsed)
    }
}

/// Spreads `elapsed` seconds over the local days between `started_at` and `ended_at`.
/// The portions always sum to `elapsed`.
fn split_by_day(
    domain: &str,
    started_at: DateTime<Local>,
    ended_at: DateTime<Local>,
    elapsed: i64,
) -> Vec<UsageDelta> {
    let last_day = DayKey::from_datetime(&ended_at);
    let mut day = DayKey::from_datetime(&started_at);
    let mut cursor = started_at;
    let mut remaining = elapsed;
    let mut deltas = Vec::new();

    while day < last_day && remaining > 0 {
        let Some(next_midnight) = day
            .next()
            .date()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        else {
            break;
        };

        let portion = next_midnight
            .signed_duration_since(cursor)
            .num_seconds()
            .clamp(0, remaining);

        push_delta(&mut deltas, day, domain, portion);
        remaining -= portion;
        cursor = next_midnight;
        day = day.next();
    }

    push_delta(&mut deltas, last_day, domain, remaining);
    deltas
}

fn push_delta(deltas: &mut Vec<UsageDelta>, day: DayKey, domain: &str, seconds: i64) {
    if seconds > 0 {
        deltas.push(UsageDelta {
            day,
            domain: domain.to_string(),
            seconds,
        });
    }
}
