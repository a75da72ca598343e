mod failing_installer;
mod recording_installer;

pub use failing_installer::FailingRuleInstaller;
pub use recording_installer::RecordingRuleInstaller;
