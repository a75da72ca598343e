//! webtally protocol definitions for host/CLI to daemon communication
//!
//! Every message travels as a 4-byte little-endian length followed by the bincode
//! encoding of a [`Request`] or [`Response`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use webtally_core::{BlockRule, IdleState};
use webtally_core::{DayKey, DayUsage};

/// `day -> domain -> seconds`, the exported form of the ledger.
pub type LedgerDays = BTreeMap<String, BTreeMap<String, i64>>;

/// Requests sent to the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// The active tab's URL became known (activation or navigation)
    ActiveUrlKnown { url: String },
    /// The system entered or left the idle/locked state
    IdleStateChanged { state: IdleState },
    /// Settings were edited; rules must be recomputed
    SettingsChanged,
    /// Tracker, usage and rule summary
    GetStatus,
    /// Per-domain totals summed over the given `YYYY-MM-DD` days
    GetUsage { days: Vec<String> },
    /// Whole ledger, day by day
    ExportLedger,
    /// Erase every stored day (explicit user action only)
    ClearLedger,
    /// Currently installed block rules
    GetRules,
    /// Ping the daemon to check if it's alive
    Ping,
}

/// Responses sent by the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Status {
        /// Domain of the open focus interval, if any
        active_domain: Option<String>,
        /// Seconds recorded today, excluding the open interval
        today_seconds: i64,
        limit_enabled: bool,
        limit_minutes: u32,
        /// Hosts covered by the installed rules
        blocked_hosts: Vec<String>,
    },
    /// Domain totals in seconds, largest first
    Usage { totals: Vec<(String, i64)> },
    /// `day -> domain -> seconds`
    Ledger { days: LedgerDays },
    Rules { rules: Vec<BlockRule> },
    /// Number of removed ledger entries
    Cleared { rows: u32 },
    /// Generic success acknowledgment
    Ok,
    /// Error response with message
    Error { message: String },
    /// Pong response to ping
    Pong,
}

#[cfg(unix)]
pub fn default_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/run/user/{}/webtally.sock", uid))
}

#[cfg(windows)]
pub fn default_socket_path() -> PathBuf {
    let local_app_data = std::env::var("LOCALAPPDATA").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(format!(r"{}\webtally\webtally.sock", local_app_data))
}

pub fn ledger_days(ledger: BTreeMap<DayKey, DayUsage>) -> LedgerDays {
    ledger
        .into_iter()
        .map(|(day, usage)| {
            let domains = usage
                .iter()
                .map(|(domain, seconds)| (domain.to_string(), seconds))
                .collect();
            (day.to_string(), domains)
        })
        .collect()
}

pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>, bincode::Error> {
    let payload = bincode::serialize(message)?;
    let mut frame = Vec::with_capacity(payload.len() + 4);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}
