use anyhow::{bail, Context, Result};
use webtally_adapters::{SqliteUsageLedger, TomlSettingsStore};
use webtally_core::Config;

fn config() -> Config {
    Config::load().unwrap_or_default()
}

/// Opens the ledger database directly, for use while the daemon is not running.
pub fn open_ledger() -> Result<SqliteUsageLedger> {
    let database_path = config().database_path();

    if !database_path.exists() {
        bail!("no usage recorded yet. Start the daemon with 'webtally start'.");
    }

    SqliteUsageLedger::new(&database_path).context("failed to open usage database")
}

pub fn settings_store() -> TomlSettingsStore {
    TomlSettingsStore::new(config().settings_path())
}
