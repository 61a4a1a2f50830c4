//! Translator configuration.
//! The API credential is optional: without it the whole layer degrades to a
//! pass-through that returns every input unchanged.

use std::time::Duration;

/// Default vendor endpoint (Deep Translate v2 via RapidAPI).
pub const DEFAULT_ENDPOINT: &str =
    "https://deep-translate1.p.rapidapi.com/language/translate/v2";

/// Host header expected by the RapidAPI broker.
pub const DEFAULT_API_HOST: &str = "deep-translate1.p.rapidapi.com";

/// Environment variable holding the vendor API key.
pub const API_KEY_ENV: &str = "TRANSLATE_API_KEY";

/// Configuration for the translation layer.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Vendor API key. `None` disables outbound calls entirely.
    pub api_key: Option<String>,
    /// Vendor endpoint URL.
    pub endpoint: String,
    /// Host header value for the request broker.
    pub api_host: String,
    /// Outbound request timeout.
    pub timeout: Duration,
    /// Debounce interval applied by bindings before issuing a request.
    pub debounce: Duration,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: Duration::from_secs(10),
            debounce: Duration::from_millis(100),
        }
    }
}

impl TranslatorConfig {
    /// Build a config from the environment. A missing or empty
    /// `TRANSLATE_API_KEY` is not an error; the client warns once at the
    /// first translate call and passes text through.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}
