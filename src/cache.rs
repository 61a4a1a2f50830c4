//! Process-wide translation cache.
//! Key: "{text}|{lang}", exact match, case- and whitespace-sensitive.
//! Entries never expire; manual clear is the only eviction path. Every write
//! rewrites the full durable snapshot, which is O(cache size) per write and
//! accepted at UI-string cardinalities.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::snapshot::SnapshotStore;

fn cache_key(text: &str, lang: &str) -> String {
    format!("{text}|{lang}")
}

/// Maps (source text, target language) to a previously fetched translation.
/// Explicitly constructed and passed by reference from the composition root;
/// the in-memory map is authoritative, the snapshot is best-effort.
pub struct TranslationCache {
    entries: Mutex<HashMap<String, String>>,
    store: Option<Arc<dyn SnapshotStore>>,
}

impl TranslationCache {
    /// In-memory only cache (no persistence across sessions).
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store: None,
        }
    }

    /// Cache backed by a durable snapshot. The snapshot is loaded once here;
    /// load failures or a corrupt blob leave the cache empty and are only
    /// logged, never surfaced.
    pub fn with_snapshot(store: Arc<dyn SnapshotStore>) -> Self {
        let mut entries = HashMap::new();
        match store.load() {
            Ok(Some(blob)) => match serde_json::from_str::<HashMap<String, String>>(&blob) {
                Ok(map) => {
                    entries = map;
                    info!(entries = entries.len(), "translation cache loaded from snapshot");
                }
                Err(e) => {
                    warn!(error = %e, "translation cache snapshot corrupt, starting empty");
                }
            },
            Ok(None) => {
                debug!("no translation cache snapshot found");
            }
            Err(e) => {
                warn!(error = %e, "translation cache snapshot load failed");
            }
        }
        Self {
            entries: Mutex::new(entries),
            store: Some(store),
        }
    }

    /// Exact-match lookup. No fuzzy matching, no source-text normalization.
    pub fn get(&self, text: &str, lang: &str) -> Option<String> {
        self.entries.lock().get(&cache_key(text, lang)).cloned()
    }

    /// Store a translation. Echo "translations" (result equal to the input)
    /// and empty results are skipped so failures that returned the original
    /// text are never cached.
    pub fn put(&self, text: &str, lang: &str, translated: &str) {
        if translated.is_empty() || translated == text {
            return;
        }
        let blob = {
            let mut entries = self.entries.lock();
            entries.insert(cache_key(text, lang), translated.to_string());
            serde_json::to_string(&*entries)
        };
        if let Some(store) = &self.store {
            match blob {
                Ok(blob) => {
                    if let Err(e) = store.store(&blob) {
                        warn!(error = %e, "translation cache snapshot write failed");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "translation cache serialization failed");
                }
            }
        }
    }

    /// Drop all entries, in memory and in the snapshot.
    pub fn clear(&self) {
        self.entries.lock().clear();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                warn!(error = %e, "translation cache snapshot clear failed");
            }
        }
        info!("translation cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Current cache keys, for diagnostics.
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemorySnapshot;

    #[test]
    fn keys_are_case_sensitive() {
        let cache = TranslationCache::new();
        cache.put("Hello", "fr", "Bonjour");
        assert_eq!(cache.get("Hello", "fr").as_deref(), Some("Bonjour"));
        assert_eq!(cache.get("hello", "fr"), None);
        assert_eq!(cache.get("Hello", "FR"), None);
    }

    #[test]
    fn echo_translations_are_not_stored() {
        let cache = TranslationCache::new();
        cache.put("Hello", "fr", "Hello");
        cache.put("Hello", "fr", "");
        assert!(cache.is_empty());
    }

    #[test]
    fn put_writes_through_to_snapshot() {
        let store = Arc::new(MemorySnapshot::new());
        let cache = TranslationCache::with_snapshot(store.clone());
        cache.put("Hello", "fr", "Bonjour");

        let blob = store.load().expect("load").expect("blob");
        let map: HashMap<String, String> = serde_json::from_str(&blob).expect("json");
        assert_eq!(map.get("Hello|fr").map(String::as_str), Some("Bonjour"));
    }

    #[test]
    fn snapshot_reloads_into_fresh_cache() {
        let store = Arc::new(MemorySnapshot::new());
        {
            let cache = TranslationCache::with_snapshot(store.clone());
            cache.put("Hello", "fr", "Bonjour");
        }
        let cache = TranslationCache::with_snapshot(store);
        assert_eq!(cache.get("Hello", "fr").as_deref(), Some("Bonjour"));
    }

    #[test]
    fn corrupt_snapshot_starts_empty() {
        let store = Arc::new(MemorySnapshot::with_blob("not json"));
        let cache = TranslationCache::with_snapshot(store);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties_memory_and_snapshot() {
        let store = Arc::new(MemorySnapshot::new());
        let cache = TranslationCache::with_snapshot(store.clone());
        cache.put("Hello", "fr", "Bonjour");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(store.load().expect("load"), None);
    }
}
