use std::collections::BTreeSet;

use crate::domain::{BlockRuleSet, Settings};

pub const LIMIT_REACHED_NOTIFICATION_ID: &str = "limit_reached";

/// Outcome of one recomputation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockDecision {
    pub hosts: BTreeSet<String>,
    /// The daily limit is exceeded while blocking is enabled; the user should be told once.
    pub limit_reached: bool,
}

impl BlockDecision {
    pub fn rules(&self) -> BlockRuleSet {
        BlockRuleSet::from_hosts(&self.hosts)
    }
}

/// Derives the hosts to block from today's usage and the current settings.
///
/// Pure: the same inputs always give the same decision.
pub fn compute_block_list(today_total_minutes: f64, settings: &Settings) -> BlockDecision {
    let mut hosts = BTreeSet::new();

    if settings.focus_mode {
        hosts.extend(focus_hosts(settings));
    }

    let over_limit =
        settings.enable_limit && today_total_minutes >= f64::from(settings.limit_minutes);
    let limit_reached = over_limit && settings.enable_block;

    if limit_reached {
        hosts.extend(focus_hosts(settings));
    }

    BlockDecision {
        hosts,
        limit_reached,
    }
}

fn focus_hosts(settings: &Settings) -> impl Iterator<Item = String> + '_ {
    settings
        .focus_sites
        .iter()
        .map(|site| site.trim())
        .filter(|site| !site.is_empty())
        .map(str::to_string)
}
