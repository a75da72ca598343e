//! webtally adapters - Infrastructure implementations
//!
//! This crate contains concrete implementations of the ports defined in webtally-core:
//! the SQLite usage ledger, the TOML settings file and the JSON block rule file.

pub mod files;
pub mod sqlite;
pub mod testing;

pub use files::{JsonRuleFile, TomlSettingsStore};
pub use sqlite::SqliteUsageLedger;
pub use testing::{FailingRuleInstaller, RecordingRuleInstaller};
