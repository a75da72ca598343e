use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_LIMIT_MINUTES: u32 = 120;

/// User settings driving the block rules. Re-read on every recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enable_limit: bool,
    pub limit_minutes: u32,
    pub enable_block: bool,
    pub focus_mode: bool,
    #[serde(deserialize_with = "deserialize_focus_sites")]
    pub focus_sites: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_limit: false,
            limit_minutes: DEFAULT_LIMIT_MINUTES,
            enable_block: false,
            focus_mode: false,
            focus_sites: Vec::new(),
        }
    }
}

impl Settings {
    /// Replaces the focus list from its comma-separated form.
    pub fn set_focus_sites(&mut self, raw: &str) {
        self.focus_sites = parse_focus_sites(raw.split(','));
    }

    pub fn focus_sites_display(&self) -> String {
        self.focus_sites.join(", ")
    }
}

/// Trims entries, drops empty ones and collapses duplicates, keeping first-seen order.
pub fn parse_focus_sites<'a>(entries: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut sites: Vec<String> = Vec::new();
    for entry in entries {
        let site = entry.trim().to_lowercase();
        if !site.is_empty() && !sites.contains(&site) {
            sites.push(site);
        }
    }
    sites
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFocusSites {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_focus_sites<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let sites = match RawFocusSites::deserialize(deserializer)? {
        RawFocusSites::Joined(raw) => parse_focus_sites(raw.split(',')),
        RawFocusSites::List(list) => parse_focus_sites(list.iter().flat_map(|entry| entry.split(','))),
    };
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_never_block() {
        let settings = Settings::default();

        assert!(!settings.enable_limit);
        assert_eq!(settings.limit_minutes, 120);
        assert!(!settings.enable_block);
        assert!(!settings.focus_mode);
        assert!(settings.focus_sites.is_empty());
    }

    #[test]
    fn parse_comma_separated_focus_sites() {
        let toml = r#"
            focus_mode = true
            focus_sites = " a.com, b.com ,,a.com "
        "#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert!(settings.focus_mode);
        assert_eq!(settings.focus_sites, vec!["a.com", "b.com"]);
    }

    #[test]
    fn parse_focus_sites_as_array() {
        let toml = r#"
            focus_sites = ["reddit.com", " youtube.com ", ""]
        "#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert_eq!(settings.focus_sites, vec!["reddit.com", "youtube.com"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let toml = r#"
            enable_limit = true
        "#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert!(settings.enable_limit);
        assert_eq!(settings.limit_minutes, DEFAULT_LIMIT_MINUTES);
        assert!(settings.focus_sites.is_empty());
    }

    #[test]
    fn negative_limit_is_rejected() {
        let toml = r#"
            limit_minutes = -5
        "#;

        assert!(toml::from_str::<Settings>(toml).is_err());
    }

    #[test]
    fn serialized_settings_load_back() {
        let mut settings = Settings {
            enable_limit: true,
            limit_minutes: 60,
            ..Settings::default()
        };
        settings.set_focus_sites("a.com, b.com");

        let content = toml::to_string(&settings).unwrap();
        let restored: Settings = toml::from_str(&content).unwrap();

        assert_eq!(restored, settings);
        assert_eq!(restored.focus_sites_display(), "a.com, b.com");
    }
}
