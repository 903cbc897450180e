use std::env;

use study_core::model::AppSettings;

pub const ENV_API_KEY: &str = "STUDY_AI_API_KEY";
pub const ENV_BASE_URL: &str = "STUDY_AI_BASE_URL";
pub const ENV_MODEL: &str = "STUDY_AI_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a world-class Data Analytics professor \
specializing in GATE 2026 and professional certifications. Your goal is to provide perfectly \
structured, academically rigorous, yet accessible study material. Always use standard \
mathematical notation for formulas and clear, single-point statements for last-minute revision.";

/// Connection details for the content generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
}

impl ContentConfig {
    /// Configuration from the environment alone. `None` without an API key.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_sources(&AppSettings::default(), env_value)
    }

    /// Persisted settings first, then the environment, then defaults.
    #[must_use]
    pub fn resolve(settings: &AppSettings) -> Option<Self> {
        Self::from_sources(settings, env_value)
    }

    /// Merges `settings` over values looked up through `env`.
    ///
    /// Returns `None` when neither source provides a non-blank API key.
    #[must_use]
    pub fn from_sources(
        settings: &AppSettings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        let pick = |stored: Option<&str>, key: &str| {
            stored
                .map(str::to_owned)
                .or_else(|| env(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()))
        };

        let api_key = pick(settings.api_key(), ENV_API_KEY)?;
        let base_url =
            pick(settings.api_base_url(), ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let model = pick(settings.api_model(), ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.into());
        let system_prompt = settings
            .ai_system_prompt()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
            .to_owned();

        Some(Self {
            base_url,
            api_key,
            model,
            system_prompt,
        })
    }

    /// `{base}/models/{model}:generateContent`
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::AppSettingsDraft;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_key_disables_generation() {
        assert!(ContentConfig::from_sources(&AppSettings::default(), no_env).is_none());

        let blank = |key: &str| (key == ENV_API_KEY).then(|| "   ".to_string());
        assert!(ContentConfig::from_sources(&AppSettings::default(), blank).is_none());
    }

    #[test]
    fn env_key_uses_defaults() {
        let env = |key: &str| (key == ENV_API_KEY).then(|| "env-key".to_string());
        let config = ContentConfig::from_sources(&AppSettings::default(), env).unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn stored_settings_override_env() {
        let settings = AppSettingsDraft {
            api_key: Some("stored".into()),
            api_model: Some("custom-model".into()),
            api_base_url: None,
            ai_system_prompt: Some("Be brief.".into()),
        }
        .validate()
        .unwrap();
        let env = |key: &str| match key {
            ENV_API_KEY => Some("env-key".to_string()),
            ENV_BASE_URL => Some("https://proxy.example/v1beta/".to_string()),
            _ => None,
        };

        let config = ContentConfig::from_sources(&settings, env).unwrap();
        assert_eq!(config.api_key, "stored");
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.base_url, "https://proxy.example/v1beta/");
        assert_eq!(config.system_prompt, "Be brief.");
        assert_eq!(
            config.endpoint(),
            "https://proxy.example/v1beta/models/custom-model:generateContent"
        );
    }
}
