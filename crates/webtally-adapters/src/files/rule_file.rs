use std::path::PathBuf;

use webtally_core::{BlockRuleSet, RuleInstallError, RuleInstaller};

use super::atomic_write::write_atomically;

/// Publishes the block rules as a JSON document for the network layer to pick up
/// (browser bridge, proxy or hosts-file writer).
pub struct JsonRuleFile {
    path: PathBuf,
}

impl JsonRuleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleInstaller for JsonRuleFile {
    fn installed(&self) -> Result<BlockRuleSet, RuleInstallError> {
        if !self.path.exists() {
            return Ok(BlockRuleSet::empty());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|error| RuleInstallError::Storage {
                message: error.to_string(),
            })?;

        serde_json::from_str(&content).map_err(|error| RuleInstallError::Storage {
            message: format!("unreadable rule file: {}", error),
        })
    }

    fn replace_all(&self, rules: &BlockRuleSet) -> Result<(), RuleInstallError> {
        let content =
            serde_json::to_vec_pretty(rules).map_err(|error| RuleInstallError::Rejected {
                message: error.to_string(),
            })?;

        write_atomically(&self.path, &content).map_err(|error| RuleInstallError::Storage {
            message: error.to_string(),
        })
    }
}
