//! Lingocache: translation memoization and debounce layer.
//!
//! Thin, failure-tolerant plumbing between UI strings and a remote
//! machine-translation vendor: a persistent (text, language) → translation
//! cache, a client that degrades to pass-through on every failure, and
//! per-string debounced bindings with stale-response suppression.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lingocache::{TranslationCache, TranslationService, TranslatorConfig};
//!
//! # async fn demo() {
//! let cache = Arc::new(TranslationCache::new());
//! let service = TranslationService::new(TranslatorConfig::from_env(), cache)
//!     .expect("http client");
//! let greeting = service.translate("Hello", "fr").await;
//! # let _ = greeting;
//! # }
//! ```

pub mod binding;
pub mod cache;
pub mod client;
pub mod config;
pub mod detect;
pub mod languages;
pub mod normalize;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;
use std::time::Duration;

pub use binding::{BindingState, TranslationBinding};
pub use cache::TranslationCache;
pub use client::{HttpTransport, TranslationClient, Transport, TransportError, VendorRequest};
pub use config::TranslatorConfig;
pub use detect::detect_language;
pub use languages::{Language, SUPPORTED_LANGUAGES};
pub use snapshot::{MemorySnapshot, SnapshotStore, SqliteSnapshot};

/// Composition root: owns the config, cache, and client, and hands out
/// bindings that share them. Construct one per application and pass it by
/// reference; nothing here is a process-global.
pub struct TranslationService {
    cache: Arc<TranslationCache>,
    client: Arc<TranslationClient>,
    debounce: Duration,
}

impl TranslationService {
    /// Wire up the real HTTP transport. Fails only if the HTTP client
    /// cannot be built; a missing API key is not an error (the layer
    /// degrades to pass-through).
    pub fn new(
        config: TranslatorConfig,
        cache: Arc<TranslationCache>,
    ) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, cache, transport))
    }

    /// Wire up with a caller-supplied transport (tests, alternate vendors).
    pub fn with_transport(
        config: TranslatorConfig,
        cache: Arc<TranslationCache>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let debounce = config.debounce;
        let client = Arc::new(TranslationClient::new(
            config,
            Arc::clone(&cache),
            transport,
        ));
        Self {
            cache,
            client,
            debounce,
        }
    }

    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        self.client.translate(text, target_lang).await
    }

    pub async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
        source_lang: &str,
    ) -> Vec<String> {
        self.client
            .translate_batch(texts, target_lang, source_lang)
            .await
    }

    /// Create a debounced binding for one displayed string, sharing this
    /// service's client and cache. Must be called inside a Tokio runtime.
    pub fn bind(
        &self,
        text: impl Into<String>,
        language: impl Into<String>,
    ) -> TranslationBinding {
        TranslationBinding::new(Arc::clone(&self.client), text, language, self.debounce)
    }

    pub fn client(&self) -> &Arc<TranslationClient> {
        &self.client
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{deep_translate_body, MockTransport};

    #[tokio::test]
    async fn service_wires_cache_and_client_together() {
        let transport =
            MockTransport::responding(|req| Ok(deep_translate_body(&format!("{}!", req.q))));
        let cache = Arc::new(TranslationCache::new());
        let config = TranslatorConfig::default().with_api_key("test-key");
        let service = TranslationService::with_transport(config, cache, transport);

        assert_eq!(service.translate("Hi", "fr").await, "Hi!");
        assert_eq!(service.cache().get("Hi", "fr").as_deref(), Some("Hi!"));
    }

    #[tokio::test(start_paused = true)]
    async fn service_bindings_share_the_cache() {
        let transport =
            MockTransport::responding(|req| Ok(deep_translate_body(&format!("{}!", req.q))));
        let cache = Arc::new(TranslationCache::new());
        let config = TranslatorConfig::default().with_api_key("test-key");
        let service = TranslationService::with_transport(config, cache, transport.clone());

        let binding = service.bind("Hello", "fr");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(binding.displayed(), "Hello!");

        // A second binding for the same string is served from the cache
        let second = service.bind("Hello", "fr");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(second.displayed(), "Hello!");
        assert_eq!(transport.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
