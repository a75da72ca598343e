//! webtally core library
//!
//! Contains the time-accounting domain (domain extraction, day keys, the activity
//! tracker state machine), the block rule engine and the port definitions (traits)
//! implemented by the adapters. This crate has no knowledge of infrastructure concerns.

pub mod config;
pub mod domain;
pub mod ports;
pub mod report;
pub mod rules;

pub use config::{
    Config, ConfigError, NotificationConfig, NotificationUrgency, RefreshConfig, StorageConfig,
};
pub use domain::{
    extract_domain, ActivityTracker, BlockRule, BlockRuleSet, DayKey, DayUsage, IdleState,
    ResourceType, Settings, UsageDelta,
};
pub use ports::{
    RuleInstallError, RuleInstaller, SettingsError, SettingsStore, UsageLedger, UsageLedgerError,
};
pub use report::{limit_progress_percent, ReportEntry, SortOrder, UsageReport};
pub use rules::{compute_block_list, BlockDecision, LIMIT_REACHED_NOTIFICATION_ID};
