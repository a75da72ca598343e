use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const FIRST_RULE_ID: u32 = 10_000;
const RULE_PRIORITY: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Script,
    Xmlhttprequest,
}

pub const BLOCKED_RESOURCE_TYPES: [ResourceType; 4] = [
    ResourceType::MainFrame,
    ResourceType::SubFrame,
    ResourceType::Script,
    ResourceType::Xmlhttprequest,
];

/// Network-layer instruction blocking every load whose host starts with `host`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRule {
    pub id: u32,
    pub priority: u32,
    pub host: String,
    pub url_filter: String,
    pub resource_types: Vec<ResourceType>,
}

impl BlockRule {
    pub fn for_host(id: u32, host: &str) -> Self {
        Self {
            id,
            priority: RULE_PRIORITY,
            host: host.to_string(),
            url_filter: format!("||{}", host),
            resource_types: BLOCKED_RESOURCE_TYPES.to_vec(),
        }
    }
}

/// The complete set of installed block rules. Always replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockRuleSet {
    rules: Vec<BlockRule>,
}

impl BlockRuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ids are assigned in host order, so equal host sets always give equal rule sets.
    pub fn from_hosts(hosts: &BTreeSet<String>) -> Self {
        let rules = hosts
            .iter()
            .filter(|host| !host.is_empty())
            .zip(FIRST_RULE_ID..)
            .map(|(host, id)| BlockRule::for_host(id, host))
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[BlockRule] {
        &self.rules
    }

    pub fn hosts(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.host.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
