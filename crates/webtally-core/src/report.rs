use crate::domain::DayUsage;

const TOP_ENTRIES: usize = 5;
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Time,
    Name,
}

impl SortOrder {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "time" => Some(SortOrder::Time),
            "name" => Some(SortOrder::Name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub label: String,
    pub seconds: i64,
}

impl ReportEntry {
    pub fn minutes(&self) -> f64 {
        self.seconds as f64 / 60.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    pub entries: Vec<ReportEntry>,
    pub total_seconds: i64,
}

impl UsageReport {
    /// Sorted by time, the five largest domains are listed and the rest summed under `Other`.
    /// Sorted by name, every domain is listed.
    pub fn build(usage: &DayUsage, order: SortOrder) -> Self {
        let mut entries: Vec<ReportEntry> = usage
            .iter()
            .map(|(domain, seconds)| ReportEntry {
                label: domain.to_string(),
                seconds,
            })
            .collect();

        match order {
            SortOrder::Time => entries.sort_by(|left, right| {
                right
                    .seconds
                    .cmp(&left.seconds)
                    .then_with(|| left.label.cmp(&right.label))
            }),
            SortOrder::Name => entries.sort_by(|left, right| left.label.cmp(&right.label)),
        }

        if order == SortOrder::Time && entries.len() > TOP_ENTRIES {
            let rest = entries.split_off(TOP_ENTRIES);
            entries.push(ReportEntry {
                label: OTHER_LABEL.to_string(),
                seconds: rest.iter().map(|entry| entry.seconds).sum(),
            });
        }

        Self {
            entries,
            total_seconds: usage.total_seconds(),
        }
    }

    pub fn total_minutes(&self) -> f64 {
        self.total_seconds as f64 / 60.0
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Share of the daily limit used so far, capped at 100. Zero when no limit applies.
pub fn limit_progress_percent(total_minutes: f64, limit_minutes: u32, enabled: bool) -> u8 {
    if !enabled || limit_minutes == 0 {
        return 0;
    }
    let percent = (total_minutes / f64::from(limit_minutes) * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(entries: &[(&str, i64)]) -> DayUsage {
        entries
            .iter()
            .map(|(domain, seconds)| (domain.to_string(), *seconds))
            .collect()
    }

    #[test]
    fn time_order_lists_largest_first() {
        let report = UsageReport::build(
            &usage(&[("low.com", 10), ("high.com", 100), ("mid.com", 50)]),
            SortOrder::Time,
        );

        let labels: Vec<&str> = report.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["high.com", "mid.com", "low.com"]);
        assert_eq!(report.total_seconds, 160);
    }

    #[test]
    fn time_order_groups_tail_into_other() {
        let report = UsageReport::build(
            &usage(&[
                ("a.com", 700),
                ("b.com", 600),
                ("c.com", 500),
                ("d.com", 400),
                ("e.com", 300),
                ("f.com", 200),
                ("g.com", 100),
            ]),
            SortOrder::Time,
        );

        assert_eq!(report.entries.len(), 6);
        let other = report.entries.last().unwrap();
        assert_eq!(other.label, OTHER_LABEL);
        assert_eq!(other.seconds, 300);
        assert_eq!(report.total_seconds, 2800);
    }

    #[test]
    fn name_order_keeps_every_entry() {
        let entries: Vec<(String, i64)> =
            (0..8).map(|index| (format!("site{}.com", index), 60)).collect();
        let report = UsageReport::build(&entries.into_iter().collect(), SortOrder::Name);

        assert_eq!(report.entries.len(), 8);
        assert_eq!(report.entries[0].label, "site0.com");
        assert!(report.entries.iter().all(|entry| entry.label != OTHER_LABEL));
    }

    #[test]
    fn limit_progress_is_capped() {
        assert_eq!(limit_progress_percent(30.0, 120, true), 25);
        assert_eq!(limit_progress_percent(300.0, 120, true), 100);
    }

    #[test]
    fn limit_progress_is_zero_when_disabled() {
        assert_eq!(limit_progress_percent(30.0, 120, false), 0);
        assert_eq!(limit_progress_percent(30.0, 0, true), 0);
    }

    #[test]
    fn sort_order_parses_known_values() {
        assert_eq!(SortOrder::from_str("TIME"), Some(SortOrder::Time));
        assert_eq!(SortOrder::from_str("name"), Some(SortOrder::Name));
        assert_eq!(SortOrder::from_str("size"), None);
    }
}
