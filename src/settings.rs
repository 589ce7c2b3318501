use serde::{Deserialize, Serialize};
use sitekeep_common::DEFAULT_API_URL;
use std::fmt;

/// Where to publish and with which key. Persisted apart from the document.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Partial change to [`ApiSettings`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ApiSettings {
    /// Configured URL, or the development endpoint when unset or blank.
    pub fn endpoint(&self) -> &str {
        non_blank(&self.api_url).unwrap_or(DEFAULT_API_URL)
    }

    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.api_url {
            self.api_url = Some(url.trim().to_string());
        }
        if let Some(key) = update.api_key {
            self.api_key = Some(key);
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &self.credential().map(|_| "<set>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_url_falls_back_to_development_endpoint() {
        assert_eq!(ApiSettings::default().endpoint(), DEFAULT_API_URL);
        let blank = ApiSettings {
            api_url: Some("  ".into()),
            api_key: None,
        };
        assert_eq!(blank.endpoint(), DEFAULT_API_URL);
    }

    #[test]
    fn blank_key_is_no_credential() {
        let settings = ApiSettings {
            api_url: None,
            api_key: Some(" ".into()),
        };
        assert_eq!(settings.credential(), None);
    }

    #[test]
    fn uses_the_stored_field_names() {
        let settings: ApiSettings =
            serde_json::from_str(r#"{"apiUrl":"https://cms.example/api/site","apiKey":"k"}"#)
                .unwrap();
        assert_eq!(settings.endpoint(), "https://cms.example/api/site");
        assert_eq!(settings.credential(), Some("k"));
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            serde_json::json!({"apiUrl": "https://cms.example/api/site", "apiKey": "k"})
        );
        assert_eq!(
            serde_json::from_str::<ApiSettings>("{}").unwrap(),
            ApiSettings::default()
        );
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut settings = ApiSettings {
            api_url: Some("http://old".into()),
            api_key: Some("key".into()),
        };
        settings.apply(SettingsUpdate {
            api_url: Some(" http://new ".into()),
            api_key: None,
        });
        assert_eq!(settings.endpoint(), "http://new");
        assert_eq!(settings.credential(), Some("key"));
    }

    #[test]
    fn debug_hides_the_key() {
        let settings = ApiSettings {
            api_url: None,
            api_key: Some("hunter2".into()),
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
