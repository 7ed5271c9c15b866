//! offline-cache - offline-first persistence and translation memoization
//!
//! This library provides two small, independent, best-effort components:
//! - [`OfflineStore`]: a durable key-value cache that stamps every write with
//!   a last-modified timestamp and an unsynced flag, so a later
//!   synchronization process can discover what has not reached the server yet
//! - [`TranslationCache`]: time-bounded memoization over a remote translation
//!   call, keyed by (text, source language, target language)
//!
//! Both are advisory layers: their public APIs never raise, failures are
//! logged and converted to benign fallbacks.
//!
//! # Example
//!
//! ```ignore
//! use offline_cache::{OfflineStore, TranslationCache};
//! use std::sync::Arc;
//!
//! // Durable store, survives restarts
//! let store = OfflineStore::file("app/offline.redb")?;
//! store.save("ai_conversation", &messages);
//!
//! for record in store.unsynced_records() {
//!     // push record to the server, then:
//!     store.mark_synced(&record.id);
//! }
//!
//! // Translation with a 24h freshness window
//! let translations = TranslationCache::new(Arc::new(my_backend));
//! let greeting = translations.translate("Welcome back", "fr", "en").await;
//! ```

mod backend;
pub mod backends;
mod error;
mod record;
mod store;
mod translate;
mod utils;

// Re-export public API
pub use backend::KvBackend;
pub use backends::memory::MemoryBackend;
pub use backends::redb::RedbBackend;
pub use error::{StoreError, TranslateError};
pub use record::StorageRecord;
pub use store::{DEFAULT_NAMESPACE, OfflineStore};
pub use translate::{DEFAULT_MAX_AGE, TranslationCache, TranslationStats, Translator};
