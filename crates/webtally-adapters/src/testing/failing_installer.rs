use webtally_core::{BlockRuleSet, RuleInstallError, RuleInstaller};

/// Installer whose every replacement fails, keeping whatever it was built with.
pub struct FailingRuleInstaller {
    error: RuleInstallError,
    current: BlockRuleSet,
}

impl FailingRuleInstaller {
    pub fn quota_exceeded() -> Self {
        Self::with_error(RuleInstallError::Rejected {
            message: "rule quota exceeded".to_string(),
        })
    }

    pub fn with_error(error: RuleInstallError) -> Self {
        Self {
            error,
            current: BlockRuleSet::empty(),
        }
    }

    pub fn with_installed(mut self, current: BlockRuleSet) -> Self {
        self.current = current;
        self
    }
}

impl RuleInstaller for FailingRuleInstaller {
    fn installed(&self) -> Result<BlockRuleSet, RuleInstallError> {
        Ok(self.current.clone())
    }

    fn replace_all(&self, _rules: &BlockRuleSet) -> Result<(), RuleInstallError> {
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_all_fails_and_keeps_current_set() {
        let installer = FailingRuleInstaller::quota_exceeded();

        let result = installer.replace_all(&BlockRuleSet::empty());

        assert!(matches!(result, Err(RuleInstallError::Rejected { .. })));
        assert!(installer.installed().unwrap().is_empty());
    }
}
