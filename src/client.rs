//! Best-effort translation client.
//! One outbound call per uncached (text, language) pair; every failure mode
//! (missing credential, transport error, rate limit, unrecognized body)
//! degrades to returning the original text. Callers never see an error.

use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::TranslationCache;
use crate::config::TranslatorConfig;
use crate::languages::{Language, SUPPORTED_LANGUAGES};
use crate::normalize::{extract_translation, normalize_lang};

/// Outbound request body: { q, source, target }.
#[derive(Debug, Clone, Serialize)]
pub struct VendorRequest {
    pub q: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug)]
pub enum TransportError {
    /// Non-2xx status other than 429. Body is truncated for logging.
    Status { code: u16, body: String },
    /// HTTP 429. Soft failure: no retry, nothing cached.
    RateLimited,
    Timeout,
    Network(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Status { code, body } => {
                write!(f, "unexpected status {code}: {body}")
            }
            TransportError::RateLimited => write!(f, "rate limited"),
            TransportError::Timeout => write!(f, "request timeout"),
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

/// The outbound HTTP seam. Returns the raw response body, read exactly once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &VendorRequest) -> Result<String, TransportError>;
}

/// reqwest-backed transport speaking to the vendor through the RapidAPI
/// broker. Connection pooling and a builder-level timeout bound every call.
/// Building from a keyless config is allowed (the client degrades to
/// pass-through without ever calling the transport), but `send` refuses to
/// issue a request without a credential.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_host: String,
}

impl HttpTransport {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            api_host: config.api_host.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &VendorRequest) -> Result<String, TransportError> {
        // TranslationClient gates on the credential before reaching here;
        // this guard keeps a directly-used keyless transport from sending
        // an empty credential header to the broker.
        if self.api_key.is_empty() {
            return Err(TransportError::Network("API key not configured".into()));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        // Read the body before the status check; it is not re-readable and
        // error bodies carry the vendor diagnostics.
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if status.as_u16() == 429 {
            return Err(TransportError::RateLimited);
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                body: snippet(&body),
            });
        }
        Ok(body)
    }
}

/// Truncate a body for log output.
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Translates single strings and batches, never failing to the caller.
pub struct TranslationClient {
    transport: Arc<dyn Transport>,
    cache: Arc<TranslationCache>,
    config: TranslatorConfig,
    missing_key_warned: Once,
}

impl TranslationClient {
    pub fn new(
        config: TranslatorConfig,
        cache: Arc<TranslationCache>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            cache,
            config,
            missing_key_warned: Once::new(),
        }
    }

    /// Translate with automatic source-language detection by the vendor.
    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        self.translate_from(text, target_lang, "auto").await
    }

    /// Translate `text` into `target_lang`. Always resolves to a string:
    /// the translation on success, the input unchanged on any failure or
    /// short-circuit.
    pub async fn translate_from(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> String {
        if text.is_empty() || target_lang.is_empty() {
            return text.to_string();
        }

        // "auto" resolves to the base language; same-language requests
        // never touch the cache or the network.
        let source = if source_lang == "auto" {
            "en"
        } else {
            normalize_lang(source_lang)
        };
        let target = normalize_lang(target_lang);
        if source == target {
            return text.to_string();
        }

        if self.config.api_key.is_none() {
            self.missing_key_warned.call_once(|| {
                warn!("translation API key not configured, passing text through untranslated");
            });
            return text.to_string();
        }

        // Cache keys use the caller's target code, not the normalized one:
        // the displayed language is what identifies the entry.
        if let Some(hit) = self.cache.get(text, target_lang) {
            debug!(target = target_lang, "translation cache hit");
            return hit;
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        let request = VendorRequest {
            q: text.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        };

        let body = match self.transport.send(&request).await {
            Ok(body) => body,
            Err(TransportError::RateLimited) => {
                warn!(%request_id, "translation API rate limited, returning original text");
                return text.to_string();
            }
            Err(e) => {
                warn!(%request_id, error = %e, "translation request failed, returning original text");
                return text.to_string();
            }
        };

        match extract_translation(&body) {
            Some(translated) => {
                debug!(%request_id, target = target_lang, "translation fetched");
                if translated != text {
                    self.cache.put(text, target_lang, &translated);
                }
                translated
            }
            None => {
                warn!(%request_id, body = %snippet(&body), "unrecognized translation response shape");
                text.to_string()
            }
        }
    }

    /// Translate a list of strings, preserving order and length. Elements
    /// fan out as individual requests; one element failing (resolving to
    /// its original text) does not affect its siblings.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
        source_lang: &str,
    ) -> Vec<String> {
        if texts.is_empty() || target_lang.is_empty() {
            return texts.to_vec();
        }
        let source = if source_lang == "auto" {
            "en"
        } else {
            normalize_lang(source_lang)
        };
        if source == normalize_lang(target_lang) {
            return texts.to_vec();
        }
        if self.config.api_key.is_none() {
            self.missing_key_warned.call_once(|| {
                warn!("translation API key not configured, passing text through untranslated");
            });
            return texts.to_vec();
        }

        let calls = texts
            .iter()
            .map(|text| self.translate_from(text, target_lang, source_lang));
        futures_util::future::join_all(calls).await
    }

    /// The target languages this layer accepts.
    pub fn supported_languages(&self) -> &'static [Language] {
        SUPPORTED_LANGUAGES
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn debounce(&self) -> Duration {
        self.config.debounce
    }
}
