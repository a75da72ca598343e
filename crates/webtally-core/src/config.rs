use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

const APPLICATION_DIRECTORY: &str = "webtally";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration read error: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("TOML parse error: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

/// Daemon configuration, read from `config.toml`. User settings that drive
/// blocking live separately in `settings.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub notifications: NotificationConfig,
    pub refresh: RefreshConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub sound_enabled: bool,
    pub urgency: NotificationUrgency,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationUrgency {
    Low,
    #[default]
    Normal,
    Critical,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub refresh_interval_minutes: u64,
    pub startup_delay_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: Option<PathBuf>,
    pub rules_path: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            urgency: NotificationUrgency::Normal,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval_minutes: 60,
            startup_delay_seconds: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        config_directory().join("config.toml")
    }

    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| data_directory().join("usage.db"))
    }

    pub fn rules_path(&self) -> PathBuf {
        self.storage
            .rules_path
            .clone()
            .unwrap_or_else(|| data_directory().join("block_rules.json"))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.storage
            .settings_path
            .clone()
            .unwrap_or_else(|| config_directory().join("settings.toml"))
    }
}

pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APPLICATION_DIRECTORY)
}

pub fn data_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APPLICATION_DIRECTORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = Config::default();

        assert!(config.notifications.sound_enabled);
        assert!(matches!(
            config.notifications.urgency,
            NotificationUrgency::Normal
        ));
        assert_eq!(config.refresh.refresh_interval_minutes, 60);
        assert_eq!(config.refresh.startup_delay_seconds, 1);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [refresh]
            refresh_interval_minutes = 15
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.refresh.refresh_interval_minutes, 15);
        assert_eq!(config.refresh.startup_delay_seconds, 1);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [notifications]
            sound_enabled = false
            urgency = "critical"

            [refresh]
            refresh_interval_minutes = 30
            startup_delay_seconds = 5

            [storage]
            database_path = "/tmp/webtally/usage.db"
            rules_path = "/tmp/webtally/rules.json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert!(!config.notifications.sound_enabled);
        assert!(matches!(
            config.notifications.urgency,
            NotificationUrgency::Critical
        ));
        assert_eq!(config.refresh.startup_delay_seconds, 5);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/webtally/usage.db")
        );
        assert_eq!(config.rules_path(), PathBuf::from("/tmp/webtally/rules.json"));
    }

    #[test]
    fn storage_paths_default_to_application_directories() {
        let config = Config::default();

        assert!(config.database_path().ends_with("webtally/usage.db"));
        assert!(config.rules_path().ends_with("webtally/block_rules.json"));
        assert!(config.settings_path().ends_with("webtally/settings.toml"));
    }
}
