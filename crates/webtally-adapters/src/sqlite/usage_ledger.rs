use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};

use webtally_core::{DayKey, DayUsage, UsageLedger, UsageLedgerError};

pub struct SqliteUsageLedger {
    connection: Mutex<Connection>,
}

impl SqliteUsageLedger {
    pub fn new(path: &Path) -> Result<Self, UsageLedgerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| UsageLedgerError::Storage {
                message: error.to_string(),
            })?;
        }

        let connection = Connection::open(path).map_err(storage_error)?;
        Self::with_connection(connection)
    }

    pub fn in_memory() -> Result<Self, UsageLedgerError> {
        let connection = Connection::open_in_memory().map_err(storage_error)?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, UsageLedgerError> {
        let ledger = Self {
            connection: Mutex::new(connection),
        };
        ledger.initialize_schema()?;

        Ok(ledger)
    }

    fn initialize_schema(&self) -> Result<(), UsageLedgerError> {
        let connection = self.connection()?;
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS daily_usage (
                    day TEXT NOT NULL,
                    domain TEXT NOT NULL,
                    seconds INTEGER NOT NULL DEFAULT 0 CHECK (seconds >= 0),
                    PRIMARY KEY (day, domain)
                 );",
            )
            .map_err(storage_error)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, UsageLedgerError> {
        self.connection
            .lock()
            .map_err(|_| UsageLedgerError::Storage {
                message: "ledger connection poisoned".to_string(),
            })
    }
}

impl UsageLedger for SqliteUsageLedger {
    fn add(&self, day: &DayKey, domain: &str, seconds: i64) -> Result<(), UsageLedgerError> {
        if seconds <= 0 || domain.is_empty() {
            return Ok(());
        }

        let connection = self.connection()?;

        connection
            .execute(
                "INSERT INTO daily_usage (day, domain, seconds)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (day, domain)
                 DO UPDATE SET seconds = seconds + excluded.seconds",
                params![day.to_string(), domain, seconds],
            )
            .map_err(storage_error)?;

        Ok(())
    }

    fn find_day(&self, day: &DayKey) -> Result<DayUsage, UsageLedgerError> {
        self.find_range(std::slice::from_ref(day))
    }

    fn find_range(&self, days: &[DayKey]) -> Result<DayUsage, UsageLedgerError> {
        let distinct_days: BTreeSet<String> = days.iter().map(DayKey::to_string).collect();
        if distinct_days.is_empty() {
            return Ok(DayUsage::new());
        }

        let connection = self.connection()?;

        let placeholders = distinct_days
            .iter()
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(",");
        let query = format!(
            "SELECT domain, SUM(seconds) AS total_seconds
             FROM daily_usage
             WHERE day IN ({})
             GROUP BY domain",
            placeholders
        );

        let mut statement = connection.prepare(&query).map_err(storage_error)?;

        let usage = statement
            .query_map(rusqlite::params_from_iter(distinct_days.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(storage_error)?
            .collect::<Result<DayUsage, _>>()
            .map_err(storage_error)?;

        Ok(usage)
    }

    fn export_all(&self) -> Result<BTreeMap<DayKey, DayUsage>, UsageLedgerError> {
        let connection = self.connection()?;

        let mut statement = connection
            .prepare("SELECT day, domain, seconds FROM daily_usage ORDER BY day, domain")
            .map_err(storage_error)?;

        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(storage_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_error)?;

        let mut days: BTreeMap<DayKey, DayUsage> = BTreeMap::new();
        for (day, domain, seconds) in rows {
            let Some(day) = DayKey::parse(&day) else {
                continue;
            };
            days.entry(day).or_default().add(&domain, seconds);
        }

        Ok(days)
    }

    fn clear_all(&self) -> Result<u32, UsageLedgerError> {
        let connection = self.connection()?;

        let deleted = connection
            .execute("DELETE FROM daily_usage", [])
            .map_err(storage_error)?;

        Ok(deleted as u32)
    }
}

fn storage_error(error: rusqlite::Error) -> UsageLedgerError {
    UsageLedgerError::Storage {
        message: error.to_string(),
    }
}
