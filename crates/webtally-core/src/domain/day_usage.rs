use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Accumulated seconds per domain, for one day or summed over several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayUsage {
    seconds_by_domain: BTreeMap<String, i64>,
}

impl DayUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, domain: &str, seconds: i64) {
        if domain.is_empty() || seconds <= 0 {
            return;
        }
        *self.seconds_by_domain.entry(domain.to_string()).or_insert(0) += seconds;
    }

    pub fn merge(&mut self, other: &DayUsage) {
        for (domain, seconds) in &other.seconds_by_domain {
            self.add(domain, *seconds);
        }
    }

    pub fn seconds_for(&self, domain: &str) -> i64 {
        self.seconds_by_domain.get(domain).copied().unwrap_or(0)
    }

    pub fn total_seconds(&self) -> i64 {
        self.seconds_by_domain.values().sum()
    }

    pub fn total_minutes(&self) -> f64 {
        self.total_seconds() as f64 / 60.0
    }

    pub fn is_empty(&self) -> bool {
        self.seconds_by_domain.is_empty()
    }

    pub fn len(&self) -> usize {
        self.seconds_by_domain.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.seconds_by_domain
            .iter()
            .map(|(domain, seconds)| (domain.as_str(), *seconds))
    }
}

impl FromIterator<(String, i64)> for DayUsage {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        let mut usage = DayUsage::new();
        for (domain, seconds) in iter {
            usage.add(&domain, seconds);
        }
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates_per_domain() {
        let mut usage = DayUsage::new();
        usage.add("x.com", 30);
        usage.add("x.com", 45);
        usage.add("y.com", 10);

        assert_eq!(usage.seconds_for("x.com"), 75);
        assert_eq!(usage.seconds_for("y.com"), 10);
        assert_eq!(usage.total_seconds(), 85);
    }

    #[test]
    fn add_ignores_non_positive_seconds_and_empty_domain() {
        let mut usage = DayUsage::new();
        usage.add("x.com", 0);
        usage.add("x.com", -5);
        usage.add("", 20);

        assert!(usage.is_empty());
    }

    #[test]
    fn merge_sums_overlapping_domains() {
        let mut monday: DayUsage = [("a.com".to_string(), 60), ("b.com".to_string(), 30)]
            .into_iter()
            .collect();
        let tuesday: DayUsage = [("a.com".to_string(), 40)].into_iter().collect();

        monday.merge(&tuesday);

        assert_eq!(monday.seconds_for("a.com"), 100);
        assert_eq!(monday.seconds_for("b.com"), 30);
    }

    #[test]
    fn total_minutes_keeps_fraction() {
        let usage: DayUsage = [("a.com".to_string(), 90)].into_iter().collect();
        assert!((usage.total_minutes() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_as_flat_object() {
        let usage: DayUsage = [("a.com".to_string(), 12)].into_iter().collect();
        assert_eq!(serde_json::to_string(&usage).unwrap(), r#"{"a.com":12}"#);
    }
}
