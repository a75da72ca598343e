mod atomic_write;
mod rule_file;
mod settings_store;

pub use rule_file::JsonRuleFile;
pub use settings_store::TomlSettingsStore;
