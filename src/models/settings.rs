// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// Site setting stored as a key/value pair
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub setting_key: String,
    pub setting_value: Option<String>,
    /// Exposed through the public GET /api/settings
    pub is_public: bool,
    pub updated_at: DateTime<Utc>,
}

/// Body of PUT /api/settings: keys to upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub settings: BTreeMap<String, String>,
    /// Visibility applied to keys created by this request
    #[serde(default)]
    pub is_public: Option<bool>,
}

pub fn settings_to_map(settings: &[Setting]) -> BTreeMap<String, Option<String>> {
    settings
        .iter()
        .map(|s| (s.setting_key.clone(), s.setting_value.clone()))
        .collect()
}

/// Setting keys are short identifiers: letters, digits, underscores, dots and dashes
pub fn is_valid_setting_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 100
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_keys() {
        assert!(is_valid_setting_key("site_title"));
        assert!(is_valid_setting_key("social.github-url"));
        assert!(!is_valid_setting_key(""));
        assert!(!is_valid_setting_key("drop table"));
    }

    #[test]
    fn test_settings_to_map() {
        let now = Utc::now();
        let settings = vec![
            Setting {
                setting_key: "theme".into(),
                setting_value: Some("dark".into()),
                is_public: true,
                updated_at: now,
            },
            Setting {
                setting_key: "tagline".into(),
                setting_value: None,
                is_public: true,
                updated_at: now,
            },
        ];
        let map = settings_to_map(&settings);
        assert_eq!(map.get("theme"), Some(&Some("dark".to_string())));
        assert_eq!(map.get("tagline"), Some(&None));
    }
}
