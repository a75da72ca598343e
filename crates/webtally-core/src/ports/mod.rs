mod rule_installer;
mod settings_store;
mod usage_ledger;

pub use rule_installer::{RuleInstallError, RuleInstaller};
pub use settings_store::{SettingsError, SettingsStore};
pub use usage_ledger::{UsageLedger, UsageLedgerError};
