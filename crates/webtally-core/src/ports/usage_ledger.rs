use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::{DayKey, DayUsage};

#[derive(Error, Debug, Clone)]
pub enum UsageLedgerError {
    #[error("usage storage error: {message}")]
    Storage { message: String },
}

/// Durable per-day, per-domain accumulated seconds.
pub trait UsageLedger: Send + Sync {
    /// Adds `seconds` to the stored total of (`day`, `domain`) in one atomic
    /// read-modify-write. Non-positive seconds or an empty domain are ignored.
    /// Returns once the increment is persisted.
    fn add(&self, day: &DayKey, domain: &str, seconds: i64) -> Result<(), UsageLedgerError>;

    fn find_day(&self, day: &DayKey) -> Result<DayUsage, UsageLedgerError>;

    /// Per-domain sum across every distinct day in `days`.
    fn find_range(&self, days: &[DayKey]) -> Result<DayUsage, UsageLedgerError>;

    fn export_all(&self) -> Result<BTreeMap<DayKey, DayUsage>, UsageLedgerError>;

    /// Erases every stored day and returns the number of removed entries.
    fn clear_all(&self) -> Result<u32, UsageLedgerError>;
}
