//! Shared test support: a scriptable mock transport and client wiring.

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::TranslationCache;
use crate::client::{TranslationClient, Transport, TransportError, VendorRequest};
use crate::config::TranslatorConfig;

static TRACING: Once = Once::new();

/// Install a test subscriber once so `RUST_LOG` controls test log output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "lingocache=debug".parse().expect("static filter")),
            )
            .with_test_writer()
            .try_init();
    });
}

type Responder = Box<dyn Fn(&VendorRequest) -> Result<String, TransportError> + Send + Sync>;

/// Transport double: counts calls, optionally delays on the mock clock,
/// and answers from a closure.
pub struct MockTransport {
    pub calls: AtomicUsize,
    respond: Responder,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn responding<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&VendorRequest) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
            delay: None,
        })
    }

    /// Like `responding`, but each call sleeps first (tokio time, so paused
    /// clocks drive it deterministically).
    pub fn responding_delayed<F>(delay: Duration, respond: F) -> Arc<Self>
    where
        F: Fn(&VendorRequest) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
            delay: Some(delay),
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &VendorRequest) -> Result<String, TransportError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(request)
    }
}

/// A transport where every call fails at the network layer.
pub fn failing_transport() -> Arc<MockTransport> {
    MockTransport::responding(|_| Err(TransportError::Network("connection refused".into())))
}

/// The canonical Deep Translate response body carrying one translation.
pub fn deep_translate_body(translated: &str) -> String {
    serde_json::json!({
        "data": { "translations": { "translatedText": [translated] } }
    })
    .to_string()
}

/// Client with a credential set, a fresh in-memory cache, and the given
/// transport.
pub fn test_client(transport: Arc<MockTransport>) -> (TranslationClient, Arc<TranslationCache>) {
    init_tracing();
    let config = TranslatorConfig::default().with_api_key("test-key");
    let cache = Arc::new(TranslationCache::new());
    let client = TranslationClient::new(config, Arc::clone(&cache), transport);
    (client, cache)
}
