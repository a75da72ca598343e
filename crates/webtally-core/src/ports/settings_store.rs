use thiserror::Error;

use crate::domain::Settings;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings read error: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("malformed settings: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("settings serialization error: {source}")]
    Serialize {
        #[from]
        source: toml::ser::Error,
    },
}

pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings, SettingsError>;

    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}
