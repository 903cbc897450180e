//! Stored AI provider settings.
//!
//! Every field is optional: anything left unset falls back to the environment
//! and then to built-in defaults when the content client is configured.

use thiserror::Error;
use url::Url;

/// AI provider configuration stored alongside the catalogue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppSettings {
    api_key: Option<String>,
    api_model: Option<String>,
    api_base_url: Option<String>,
    ai_system_prompt: Option<String>,
}

/// Unvalidated input for [`AppSettings`], as typed by the user or read from storage.
#[derive(Clone, Debug, Default)]
pub struct AppSettingsDraft {
    pub api_key: Option<String>,
    pub api_model: Option<String>,
    pub api_base_url: Option<String>,
    pub ai_system_prompt: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("invalid base URL")]
    InvalidBaseUrl,
    #[error("base URL must use http or https, got `{0}`")]
    UnsupportedScheme(String),
    #[error("model name `{0}` cannot contain whitespace, `/` or `:`")]
    InvalidModel(String),
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// Blank values become `None`. The base URL loses any trailing `/` so it
    /// can be joined with `models/{model}:generateContent`, which is also why
    /// the model name may not contain path or method separators.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` for a malformed or non-HTTP base URL, or a
    /// model name that cannot be placed in the request path.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        let api_base_url = blank_to_none(self.api_base_url)
            .map(|raw| check_base_url(&raw))
            .transpose()?;
        let api_model = blank_to_none(self.api_model)
            .map(check_model)
            .transpose()?;

        Ok(AppSettings {
            api_key: blank_to_none(self.api_key),
            api_model,
            api_base_url,
            ai_system_prompt: blank_to_none(self.ai_system_prompt),
        })
    }
}

impl AppSettings {
    /// Rebuild settings from stored columns, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if a stored value no longer validates.
    pub fn from_persisted(draft: AppSettingsDraft) -> Result<Self, AppSettingsError> {
        draft.validate()
    }

    /// True when a key is stored, so generation works without the environment.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn api_model(&self) -> Option<&str> {
        self.api_model.as_deref()
    }

    #[must_use]
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    #[must_use]
    pub fn ai_system_prompt(&self) -> Option<&str> {
        self.ai_system_prompt.as_deref()
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_owned();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn check_base_url(raw: &str) -> Result<String, AppSettingsError> {
    let url = Url::parse(raw).map_err(|_| AppSettingsError::InvalidBaseUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppSettingsError::UnsupportedScheme(url.scheme().to_owned()));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn check_model(model: String) -> Result<String, AppSettingsError> {
    if model.contains(|c: char| c.is_whitespace() || c == '/' || c == ':') {
        return Err(AppSettingsError::InvalidModel(model));
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_dropped() {
        let settings = AppSettingsDraft {
            api_key: Some("  secret ".into()),
            api_model: Some("   ".into()),
            api_base_url: None,
            ai_system_prompt: Some(String::new()),
        }
        .validate()
        .unwrap();

        assert_eq!(settings.api_key(), Some("secret"));
        assert!(settings.has_api_key());
        assert_eq!(settings.api_model(), None);
        assert_eq!(settings.ai_system_prompt(), None);
    }

    #[test]
    fn base_url_must_parse() {
        let err = AppSettingsDraft {
            api_base_url: Some("not a url".into()),
            ..AppSettingsDraft::new()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, AppSettingsError::InvalidBaseUrl);
    }

    #[test]
    fn base_url_must_be_http() {
        let err = AppSettingsDraft {
            api_base_url: Some("ftp://example.com/v1beta".into()),
            ..AppSettingsDraft::new()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, AppSettingsError::UnsupportedScheme("ftp".into()));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let settings = AppSettingsDraft {
            api_base_url: Some("https://generativelanguage.googleapis.com/v1beta/".into()),
            ..AppSettingsDraft::new()
        }
        .validate()
        .unwrap();
        assert_eq!(
            settings.api_base_url(),
            Some("https://generativelanguage.googleapis.com/v1beta")
        );
        assert!(!settings.has_api_key());
    }

    #[test]
    fn model_must_fit_in_request_path() {
        for bad in ["models/gemini", "gemini:generateContent", "gemini flash"] {
            let err = AppSettingsDraft {
                api_model: Some(bad.into()),
                ..AppSettingsDraft::new()
            }
            .validate()
            .unwrap_err();
            assert_eq!(err, AppSettingsError::InvalidModel(bad.into()));
        }
    }
}
