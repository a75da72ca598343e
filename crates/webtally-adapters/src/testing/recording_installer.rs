use std::sync::Mutex;

use webtally_core::{BlockRuleSet, RuleInstallError, RuleInstaller};

/// In-memory installer keeping every applied set, newest last.
pub struct RecordingRuleInstaller {
    history: Mutex<Vec<BlockRuleSet>>,
}

impl RecordingRuleInstaller {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<BlockRuleSet> {
        self.history.lock().unwrap().clone()
    }

    pub fn install_count(&self) -> usize {
        self.history.lock().unwrap().len()
    }
}

impl Default for RecordingRuleInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleInstaller for RecordingRuleInstaller {
    fn installed(&self) -> Result<BlockRuleSet, RuleInstallError> {
        let history = self.history.lock().unwrap();
        Ok(history.last().cloned().unwrap_or_default())
    }

    fn replace_all(&self, rules: &BlockRuleSet) -> Result<(), RuleInstallError> {
        self.history.lock().unwrap().push(rules.clone());
        Ok(())
    }
}
