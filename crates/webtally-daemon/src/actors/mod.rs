mod notifier;
mod rules;
mod tracker;

pub use notifier::{NotifierActor, NotifierHandle};
pub use rules::{RefreshReason, RulesActor, RulesHandle};
pub use tracker::{TrackerActor, TrackerHandle};
