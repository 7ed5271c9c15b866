use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::TranslateError;
use crate::utils::now_ms;

/// Freshness window applied when no explicit max age is given.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Language of the untranslated source content.
const DEFAULT_BASE_LANGUAGE: &str = "en";

/// A translation backend: given text and language codes, returns translated
/// text or fails.
///
/// Transport is out of scope here; implementations typically wrap an HTTP
/// client for a hosted translation API. Tests use counting fakes.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_lang` into `target_lang`.
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> Result<String, TranslateError>;
}

/// A memoized translation result.
#[derive(Debug, Clone)]
struct CachedTranslation {
    translated_text: String,
    /// Unix timestamp in milliseconds of insertion.
    cached_at: i64,
}

impl CachedTranslation {
    fn is_fresh(&self, now_ms: i64, max_age: Duration) -> bool {
        now_ms - self.cached_at < max_age.as_millis() as i64
    }
}

/// Counter snapshot from a [`TranslationCache`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Lookups answered from a fresh cache entry.
    pub hits: u64,
    /// Lookups that had to go through the uncached path. Expired entries
    /// count as misses too.
    pub misses: u64,
    /// Entries found expired, on lookup or during a purge.
    pub expired: u64,
    /// Entries written into the cache.
    pub inserts: u64,
    /// Backend calls that failed and fell back to the original text.
    pub backend_errors: u64,
}

impl TranslationStats {
    /// Fraction of lookups answered from cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

#[derive(Default)]
struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    inserts: AtomicU64,
    backend_errors: AtomicU64,
}

impl StatCounters {
    fn snapshot(&self) -> TranslationStats {
        TranslationStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            backend_errors: self.backend_errors.load(Ordering::Relaxed),
        }
    }
}

/// Time-bounded memoization over a remote translation call.
///
/// Results are keyed by (text, source language, target language) and are
/// valid for a configurable freshness window (24 hours by default). Entries
/// only ever overwrite each other; there is no capacity bound or LRU.
///
/// Translation is an enhancement, not a correctness-critical operation, so
/// every failure of the underlying backend is absorbed: the original text is
/// returned and the cause is logged. Callers never see an error.
///
/// Concurrent lookups for the same key are not deduplicated; if two callers
/// miss simultaneously, both hit the backend and the last result wins.
///
/// Construct one cache at application start and share it by reference.
pub struct TranslationCache {
    backend: Arc<dyn Translator>,
    entries: RwLock<HashMap<String, CachedTranslation>>,
    max_age: Duration,
    /// Translating into this language is the identity.
    base_language: String,
    /// Language the UI is currently being rendered in.
    target_language: RwLock<String>,
    stats: StatCounters,
}

impl TranslationCache {
    /// Create a cache over the given backend with the default freshness
    /// window of [`DEFAULT_MAX_AGE`].
    pub fn new(backend: Arc<dyn Translator>) -> Self {
        Self::with_max_age(backend, DEFAULT_MAX_AGE)
    }

    /// Create a cache with a custom default freshness window.
    pub fn with_max_age(backend: Arc<dyn Translator>, max_age: Duration) -> Self {
        TranslationCache {
            backend,
            entries: RwLock::new(HashMap::new()),
            max_age,
            base_language: DEFAULT_BASE_LANGUAGE.to_string(),
            target_language: RwLock::new(DEFAULT_BASE_LANGUAGE.to_string()),
            stats: StatCounters::default(),
        }
    }

    /// Set the language the source content is written in.
    ///
    /// Requests to translate into this language short-circuit without
    /// touching the backend. Defaults to `"en"`.
    pub fn with_base_language(mut self, base_language: &str) -> Self {
        self.base_language = base_language.to_string();
        self
    }

    /// Translate `text` with memoization, using the default freshness
    /// window.
    ///
    /// On backend failure the original text is returned unchanged.
    pub async fn translate(&self, text: &str, target_lang: &str, source_lang: &str) -> String {
        self.translate_with_max_age(text, target_lang, source_lang, self.max_age)
            .await
    }

    /// Translate `text` with memoization, accepting cached entries up to
    /// `max_age` old.
    pub async fn translate_with_max_age(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
        max_age: Duration,
    ) -> String {
        let cache_key = build_translation_key(text, source_lang, target_lang);
        let now = now_ms();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&cache_key) {
                if entry.is_fresh(now, max_age) {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    return entry.translated_text.clone();
                }
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        match self.translate_uncached(text, target_lang, source_lang).await {
            Ok(translated) => {
                let mut entries = self.entries.write().await;
                entries.insert(
                    cache_key,
                    CachedTranslation {
                        translated_text: translated.clone(),
                        cached_at: now_ms(),
                    },
                );
                self.stats.inserts.fetch_add(1, Ordering::Relaxed);
                translated
            }
            Err(e) => {
                self.stats.backend_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "Translation failed, returning original text: target={}, source={}, error={}",
                    target_lang,
                    source_lang,
                    e
                );
                text.to_string()
            }
        }
    }

    /// Set the language to render the UI in.
    pub async fn set_target_language(&self, lang: &str) {
        let mut target = self.target_language.write().await;
        *target = lang.to_string();
    }

    /// The language the UI is currently being rendered in.
    pub async fn target_language(&self) -> String {
        self.target_language.read().await.clone()
    }

    /// Translate base-language content into the current target language.
    pub async fn translate_to_current(&self, text: &str) -> String {
        let target = self.target_language().await;
        let base = self.base_language.clone();
        self.translate(text, &target, &base).await
    }

    /// Pre-populate the cache for a batch of (text, target language, source
    /// language) triples, translating concurrently.
    ///
    /// Already-fresh entries are served from cache and left untouched.
    pub async fn warm_up(&self, entries: &[(String, String, String)]) {
        let tasks = entries
            .iter()
            .map(|(text, target, source)| self.translate(text, target, source));
        join_all(tasks).await;
    }

    /// Remove entries older than the default freshness window.
    ///
    /// Returns the number of entries removed. The cache also treats expired
    /// entries as absent on lookup, so this exists purely to bound memory
    /// for long-running processes.
    pub async fn purge_expired(&self) -> usize {
        let now = now_ms();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.max_age));
        let removed = before - entries.len();

        if removed > 0 {
            self.stats.expired.fetch_add(removed as u64, Ordering::Relaxed);
            tracing::debug!("Purged expired translations: removed={}", removed);
        }
        removed
    }

    /// Number of entries currently cached, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Snapshot of the cache's counters.
    pub fn stats(&self) -> TranslationStats {
        self.stats.snapshot()
    }

    /// The uncached translation path.
    ///
    /// Translating into the base language or into the source language is the
    /// identity; the backend is only consulted for real language pairs.
    async fn translate_uncached(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> Result<String, TranslateError> {
        if target_lang == self.base_language || target_lang == source_lang {
            return Ok(text.to_string());
        }

        self.backend.translate(text, target_lang, source_lang).await
    }
}

/// Composite cache key: `{text}_{source}_{target}`.
fn build_translation_key(text: &str, source_lang: &str, target_lang: &str) -> String {
    format!("{}_{}_{}", text, source_lang, target_lang)
}
