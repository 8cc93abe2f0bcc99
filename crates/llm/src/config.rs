use std::fmt;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "OPENAI_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for the OpenAI-compatible endpoint.
/// Read once; immutable afterwards.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url,
            model,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reads the process environment (and a `.env` file if one exists).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None, None, None)
    }

    /// Explicit arguments win over the environment, which wins over defaults.
    pub fn resolve(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "no .env file loaded");
        }
        Self::resolve_with(|name| std::env::var(name).ok(), api_key, base_url, model)
    }

    pub fn resolve_with<F>(
        lookup: F,
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |v: String| (!v.trim().is_empty()).then_some(v);

        let api_key = api_key
            .and_then(non_blank)
            .or_else(|| lookup(API_KEY_VAR).and_then(non_blank))
            .ok_or(ConfigError::MissingCredential {
                variable: API_KEY_VAR,
            })?;
        let base_url = base_url
            .and_then(non_blank)
            .or_else(|| lookup(BASE_URL_VAR).and_then(non_blank))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .and_then(non_blank)
            .or_else(|| lookup(MODEL_VAR).and_then(non_blank))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, base_url, model))
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_from_env() {
        let config = LlmConfig::resolve_with(env(&[(API_KEY_VAR, "sk-test")]), None, None, None).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_explicit_arguments_override() {
        let lookup = env(&[(API_KEY_VAR, "sk-env"), (MODEL_VAR, "env-model")]);
        let config = LlmConfig::resolve_with(
            lookup,
            Some("sk-arg".to_string()),
            Some("http://localhost:8080/v1/".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.api_key, "sk-arg");
        assert_eq!(config.model, "env-model");
        assert_eq!(config.chat_completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_missing_credential() {
        let err = LlmConfig::resolve_with(env(&[(API_KEY_VAR, "  ")]), None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = LlmConfig::new("sk-secret".into(), DEFAULT_BASE_URL.into(), DEFAULT_MODEL.into());
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
