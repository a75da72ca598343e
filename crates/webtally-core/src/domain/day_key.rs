use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

const FORMAT: &str = "%Y-%m-%d";

/// Calendar day partition of the usage ledger, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime(datetime: &DateTime<Local>) -> Self {
        Self(datetime.date_naive())
    }

    pub fn parse(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value.trim(), FORMAT)
            .ok()
            .map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + Duration::days(1))
    }

    /// The `count` days ending at (and including) `last`, oldest first.
    pub fn last_days(count: u32, last: DayKey) -> Vec<DayKey> {
        (0..count as i64)
            .rev()
            .map(|offset| Self(last.0 - Duration::days(offset)))
            .collect()
    }

    /// Every day of `last`'s calendar month up to and including `last`.
    pub fn month_of(last: DayKey) -> Vec<DayKey> {
        let count = last.0.day();
        Self::last_days(count, last)
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl From<DayKey> for String {
    fn from(day: DayKey) -> Self {
        day.to_string()
    }
}

impl TryFrom<String> for DayKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid day key: {}", value))
    }
}
