//! Integration tests for the offline store and the translation cache.

use async_trait::async_trait;
use offline_cache::{
    KvBackend, MemoryBackend, OfflineStore, StorageRecord, StoreError, TranslateError,
    TranslationCache, Translator,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Test Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

fn assistant_greeting() -> Vec<Message> {
    vec![Message {
        role: "assistant".into(),
        content: "Hi".into(),
    }]
}

// ============================================================================
// Fake Translation Backend
// ============================================================================

/// Dictionary-backed translator that counts invocations.
struct DictionaryTranslator {
    entries: HashMap<(String, String, String), String>,
    calls: AtomicUsize,
}

impl DictionaryTranslator {
    fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            ("hello".into(), "fr".into(), "en".into()),
            "bonjour".into(),
        );
        entries.insert(("hello".into(), "es".into(), "en".into()), "hola".into());
        DictionaryTranslator {
            entries,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for DictionaryTranslator {
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (text.to_string(), target_lang.to_string(), source_lang.to_string());
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| TranslateError::Backend(format!("no entry for '{}'", text)))
    }
}

/// Backend that fails every call, for fail-open coverage.
struct OfflineTranslator;

#[async_trait]
impl Translator for OfflineTranslator {
    async fn translate(
        &self,
        _text: &str,
        _target_lang: &str,
        _source_lang: &str,
    ) -> Result<String, TranslateError> {
        Err(TranslateError::Backend("network unreachable".to_string()))
    }
}

// ============================================================================
// Fake Storage Backend
// ============================================================================

/// Backend that rejects every operation, as when local storage is disabled
/// or the quota is exhausted.
struct BrokenBackend;

impl KvBackend for BrokenBackend {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::backend("broken", key, "quota exceeded"))
    }

    fn set_item(&self, key: &str, _document: &str) -> Result<(), StoreError> {
        Err(StoreError::backend("broken", key, "quota exceeded"))
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::backend("broken", key, "quota exceeded"))
    }

    fn keys(&self, _prefix: Option<&str>) -> Result<Vec<String>, StoreError> {
        Err(StoreError::backend("broken", "", "quota exceeded"))
    }
}

// ============================================================================
// Offline Store Tests
// ============================================================================

#[test]
fn test_scenario_conversation_sync_cycle() {
    let store = OfflineStore::memory();

    store.save("ai_conversation", &assistant_greeting());

    let loaded: Option<Vec<Message>> = store.get("ai_conversation");
    assert_eq!(loaded, Some(assistant_greeting()));

    let unsynced = store.unsynced_records();
    assert_eq!(unsynced.len(), 1);
    assert_eq!(unsynced[0].id, "ai_conversation");
    assert!(!unsynced[0].synced);

    store.mark_synced("ai_conversation");
    assert!(store.unsynced_records().is_empty());
}

#[test]
fn test_overwrite_resets_sync_flag() {
    let store = OfflineStore::memory();

    store.save("note", &"first".to_string());
    store.mark_synced("note");
    store.save("note", &"second".to_string());

    let result: Option<String> = store.get("note");
    assert_eq!(result, Some("second".to_string()));

    let record: StorageRecord<String> = store.record("note").unwrap();
    assert!(!record.synced);
}

#[test]
fn test_clear_respects_namespace_boundary() {
    let backend = Arc::new(MemoryBackend::new());
    let store = OfflineStore::new(backend.clone());

    store.save("a", &1u32);
    store.save("b", &2u32);

    // Unrelated data placed directly in the shared backend
    backend.set_item("session_token", "abc123").unwrap();

    store.clear();

    assert!(store.get::<u32>("a").is_none());
    assert!(store.get::<u32>("b").is_none());
    assert_eq!(
        backend.get_item("session_token").unwrap().as_deref(),
        Some("abc123")
    );
}

#[test]
fn test_durable_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offline.redb");

    {
        let store = OfflineStore::file(&path).unwrap();
        store.save("ai_conversation", &assistant_greeting());
        store.save("draft", &"unfinished".to_string());
        store.mark_synced("draft");
    }

    let store = OfflineStore::file(&path).unwrap();

    let loaded: Option<Vec<Message>> = store.get("ai_conversation");
    assert_eq!(loaded, Some(assistant_greeting()));

    // Sync flags are part of the durable state
    let unsynced = store.unsynced_records();
    assert_eq!(unsynced.len(), 1);
    assert_eq!(unsynced[0].id, "ai_conversation");
}

#[test]
fn test_broken_backend_degrades_silently() {
    let store = OfflineStore::new(Arc::new(BrokenBackend));

    // Nothing here panics or returns an error
    store.save("key", &"value".to_string());
    assert!(store.get::<String>("key").is_none());
    store.remove("key");
    store.mark_synced("key");
    store.clear();
    assert!(store.unsynced_records().is_empty());

    assert!(!store.is_available());
}

#[test]
fn test_is_available_on_working_backend() {
    let backend = Arc::new(MemoryBackend::new());
    let store = OfflineStore::new(backend.clone());

    assert!(store.is_available());

    // The probe must not leave a record behind
    assert!(store.unsynced_records().is_empty());
    assert!(backend.keys(None).unwrap().is_empty());
}

// ============================================================================
// Translation Cache Tests
// ============================================================================

#[tokio::test]
async fn test_translation_cache_freshness_window() {
    let backend = Arc::new(DictionaryTranslator::new());
    let cache = TranslationCache::new(backend.clone());

    // First call populates the cache
    let first = cache.translate("hello", "fr", "en").await;
    assert_eq!(first, "bonjour");
    assert_eq!(backend.call_count(), 1);

    // Second call within max_age is served from cache
    let second = cache.translate("hello", "fr", "en").await;
    assert_eq!(second, "bonjour");
    assert_eq!(backend.call_count(), 1);

    // A different language pair is a separate entry
    let spanish = cache.translate("hello", "es", "en").await;
    assert_eq!(spanish, "hola");
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_translation_cache_expiry_triggers_backend() {
    let backend = Arc::new(DictionaryTranslator::new());
    let cache = TranslationCache::new(backend.clone());

    let first = cache
        .translate_with_max_age("hello", "fr", "en", Duration::from_millis(50))
        .await;
    assert_eq!(first, "bonjour");
    assert_eq!(backend.call_count(), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let refreshed = cache
        .translate_with_max_age("hello", "fr", "en", Duration::from_millis(50))
        .await;
    assert_eq!(refreshed, "bonjour");
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_translation_noop_languages() {
    let backend = Arc::new(DictionaryTranslator::new());
    let cache = TranslationCache::new(backend.clone());

    assert_eq!(cache.translate("hello", "en", "en").await, "hello");
    assert_eq!(cache.translate("hello", "fr", "fr").await, "hello");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_translation_fails_open() {
    let cache = TranslationCache::new(Arc::new(OfflineTranslator));

    let result = cache.translate("hello", "fr", "en").await;
    assert_eq!(result, "hello");

    // The failure is not cached, so recovery is possible on the next call
    assert!(cache.is_empty().await);
    assert_eq!(cache.stats().backend_errors, 1);
}

#[tokio::test]
async fn test_translation_unknown_text_falls_back() {
    let backend = Arc::new(DictionaryTranslator::new());
    let cache = TranslationCache::new(backend.clone());

    // The dictionary has no entry, the backend errors, the input comes back
    let result = cache.translate("untranslatable", "fr", "en").await;
    assert_eq!(result, "untranslatable");
    assert_eq!(backend.call_count(), 1);
}

// ============================================================================
// Shared Usage
// ============================================================================

#[tokio::test]
async fn test_components_share_a_process() {
    // Both components constructed once at startup, as an application would
    let store = OfflineStore::memory();
    let translations = TranslationCache::new(Arc::new(DictionaryTranslator::new()));

    let greeting = translations.translate("hello", "fr", "en").await;
    store.save("greeting", &greeting);

    let loaded: Option<String> = store.get("greeting");
    assert_eq!(loaded, Some("bonjour".to_string()));
    assert_eq!(store.unsynced_records().len(), 1);
}
