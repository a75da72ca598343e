mod activity;
mod block_rule;
mod day_key;
mod day_usage;
mod domain_name;
mod settings;

pub use activity::{ActivityTracker, IdleState, UsageDelta};
pub use block_rule::{BlockRule, BlockRuleSet, ResourceType};
pub use day_key::DayKey;
pub use day_usage::DayUsage;
pub use domain_name::extract_domain;
pub use settings::Settings;
