use std::path::{Path, PathBuf};

use webtally_core::{Settings, SettingsError, SettingsStore};

use super::atomic_write::write_atomically;

pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(settings)?;
        write_atomically(&self.path, content.as_bytes())?;
        Ok(())
    }
}
