//! Per-string debounced translation binding.
//! Each displayed UI string owns one binding. A change of text or language
//! re-arms it: the original text is shown immediately, a short debounce
//! coalesces rapid-fire changes into one request, and a stale in-flight
//! result is discarded via a generation check at the single point where a
//! result is about to be applied. The transport offers no cancellation, so
//! superseded responses are dropped on arrival rather than aborted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::TranslationClient;
use crate::normalize::normalize_lang;

/// Observable binding state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Showing the original text; nothing outstanding.
    Idle,
    /// Debounce armed or request in flight.
    Pending,
    /// Showing a fetched translation.
    Resolved,
}

struct BindingInner {
    generation: AtomicU64,
    current_token: Mutex<CancellationToken>,
    closed: AtomicBool,
    state: Mutex<BindingState>,
    original: Mutex<String>,
    language: Mutex<String>,
    displayed: watch::Sender<String>,
}

impl BindingInner {
    /// Cancel the previous arm and hand out a token + generation for the
    /// next one. A result is applied only while its generation is current.
    fn supersede(&self) -> (CancellationToken, u64) {
        let mut guard = self.current_token.lock();
        guard.cancel();
        let fresh = CancellationToken::new();
        let child = fresh.child_token();
        *guard = fresh;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (child, generation)
    }
}

/// Live association between one displayed string and its translation state.
/// Must be created inside a Tokio runtime; translation work runs on spawned
/// tasks. Last write wins by arming order, never by response arrival order.
pub struct TranslationBinding {
    client: Arc<TranslationClient>,
    debounce: Duration,
    inner: Arc<BindingInner>,
}

impl TranslationBinding {
    pub fn new(
        client: Arc<TranslationClient>,
        text: impl Into<String>,
        language: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        let text = text.into();
        let (displayed, _) = watch::channel(text.clone());
        let binding = Self {
            client,
            debounce,
            inner: Arc::new(BindingInner {
                generation: AtomicU64::new(0),
                current_token: Mutex::new(CancellationToken::new()),
                closed: AtomicBool::new(false),
                state: Mutex::new(BindingState::Idle),
                original: Mutex::new(text),
                language: Mutex::new(language.into()),
                displayed,
            }),
        };
        binding.arm();
        binding
    }

    /// Replace the authoritative original text and re-arm.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.inner.original.lock() = text.into();
        self.arm();
    }

    /// Switch the target language and re-arm.
    pub fn set_language(&self, language: impl Into<String>) {
        *self.inner.language.lock() = language.into();
        self.arm();
    }

    /// The text the UI should show right now.
    pub fn displayed(&self) -> String {
        self.inner.displayed.borrow().clone()
    }

    /// Subscribe to displayed-text changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.inner.displayed.subscribe()
    }

    pub fn state(&self) -> BindingState {
        *self.inner.state.lock()
    }

    /// Tear the binding down: cancels any pending timer and marks every
    /// in-flight result stale. Safe to call more than once.
    pub fn teardown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.current_token.lock().cancel();
        *self.inner.state.lock() = BindingState::Idle;
    }

    fn arm(&self) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        let (token, my_generation) = self.inner.supersede();

        let original = self.inner.original.lock().clone();
        let language = self.inner.language.lock().clone();

        // The original shows while translation is outstanding; a stale
        // translation must never flash in between.
        self.inner.displayed.send_replace(original.clone());

        // Empty language is treated like empty text: nothing to ask for.
        if original.is_empty() || language.is_empty() || normalize_lang(&language) == "en" {
            *self.inner.state.lock() = BindingState::Idle;
            return;
        }
        *self.inner.state.lock() = BindingState::Pending;

        let client = Arc::clone(&self.client);
        let inner = Arc::clone(&self.inner);
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(debounce) => {}
                _ = token.cancelled() => return,
            }

            let translated = client.translate(&original, &language).await;

            // The one point where a result is applied; everything stale
            // stops here.
            if token.is_cancelled()
                || inner.closed.load(Ordering::SeqCst)
                || inner.generation.load(Ordering::SeqCst) != my_generation
            {
                debug!(generation = my_generation, "discarding stale translation result");
                return;
            }

            let resolved = translated != original;
            inner.displayed.send_replace(translated);
            *inner.state.lock() = if resolved {
                BindingState::Resolved
            } else {
                BindingState::Idle
            };
        });
    }
}

impl Drop for TranslationBinding {
    fn drop(&mut self) {
        self.teardown();
    }
}
