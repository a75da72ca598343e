use thiserror::Error;

use crate::domain::BlockRuleSet;

#[derive(Error, Debug, Clone)]
pub enum RuleInstallError {
    #[error("rule installation rejected: {message}")]
    Rejected { message: String },

    #[error("rule storage error: {message}")]
    Storage { message: String },
}

/// Network-layer rule sink.
pub trait RuleInstaller: Send + Sync {
    fn installed(&self) -> Result<BlockRuleSet, RuleInstallError>;

    /// Removes every previously installed rule and installs `rules` in one step.
    /// On error the previous set must still be in place.
    fn replace_all(&self, rules: &BlockRuleSet) -> Result<(), RuleInstallError>;
}
