use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

use crate::backend::KvBackend;
use crate::backends::memory::MemoryBackend;
use crate::backends::redb::RedbBackend;
use crate::error::StoreError;
use crate::record::StorageRecord;
use crate::utils::build_storage_key;

/// Namespace under which records are stored unless overridden.
pub const DEFAULT_NAMESPACE: &str = "offline";

/// Throwaway key used by the availability probe.
const PROBE_KEY: &str = "__probe__";

/// Durable key-value cache with sync tracking.
///
/// Every write stamps the record with a last-modified timestamp and clears
/// its `synced` flag; [`unsynced_records`](OfflineStore::unsynced_records)
/// lets an external synchronization process discover what has not yet been
/// propagated to the remote system of record.
///
/// All keys are namespaced with a fixed prefix so unrelated data sharing the
/// same backend is never touched.
///
/// The public API never returns an error: the store is a best-effort
/// convenience layer, not a transactional one. Failures are logged and
/// absorbed, and callers must not assume durability succeeded.
///
/// # Example
/// ```ignore
/// let store = OfflineStore::file("~/.app/offline.redb")?;
///
/// store.save("draft", &draft);
/// let draft: Option<Draft> = store.get("draft");
///
/// for record in store.unsynced_records() {
///     push_to_server(&record);
///     store.mark_synced(&record.id);
/// }
/// ```
#[derive(Clone)]
pub struct OfflineStore {
    backend: Arc<dyn KvBackend>,
    namespace: String,
}

impl OfflineStore {
    /// Create a store over the given backend, under [`DEFAULT_NAMESPACE`].
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self::with_namespace(backend, DEFAULT_NAMESPACE)
    }

    /// Create a store with a custom namespace.
    ///
    /// Use this when several stores must share one backend without seeing
    /// each other's records.
    pub fn with_namespace(backend: Arc<dyn KvBackend>, namespace: &str) -> Self {
        OfflineStore {
            backend,
            namespace: namespace.to_string(),
        }
    }

    /// Create a store backed by an in-memory map.
    ///
    /// Ideal for tests and development. All data is lost when the process
    /// exits.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Create a store backed by a file-based redb database.
    ///
    /// This is the durable production backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created. This is
    /// the one fallible entry point: without a backend there is no store to
    /// degrade gracefully.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let backend = RedbBackend::open(path)?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// The namespace this store prefixes onto every key.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Persist `value` under `key`.
    ///
    /// The record is written with `synced = false` and the current timestamp,
    /// fully overwriting any previous record for the key. On serialization or
    /// backend failure the error is logged and absorbed.
    pub fn save<V: Serialize>(&self, key: &str, value: &V) {
        if let Err(e) = self.try_save(key, value) {
            tracing::warn!(
                "Failed to save record: namespace={}, key={}, error={}",
                self.namespace,
                key,
                e
            );
        }
    }

    /// Return the value stored under `key`.
    ///
    /// `None` if the key is absent or the record cannot be read or decoded
    /// (failures are logged, not raised).
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        self.record(key).map(|record| record.value)
    }

    /// Return the full record stored under `key`, including its timestamp
    /// and sync flag.
    pub fn record<V: DeserializeOwned>(&self, key: &str) -> Option<StorageRecord<V>> {
        match self.try_record(key) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "Failed to read record: namespace={}, key={}, error={}",
                    self.namespace,
                    key,
                    e
                );
                None
            }
        }
    }

    /// Delete the record under `key`. No error if absent.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(&self.storage_key(key)) {
            tracing::warn!(
                "Failed to remove record: namespace={}, key={}, error={}",
                self.namespace,
                key,
                e
            );
        }
    }

    /// Return every record in this namespace that has not been marked as
    /// synced.
    ///
    /// Values come back type-erased as [`serde_json::Value`] since a sync
    /// process handles records of mixed types. Scan order follows the
    /// backend's iteration order and is not guaranteed stable. Records that
    /// fail to decode are logged and skipped.
    pub fn unsynced_records(&self) -> Vec<StorageRecord<serde_json::Value>> {
        match self.try_unsynced_records() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "Failed to scan unsynced records: namespace={}, error={}",
                    self.namespace,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Mark the record under `key` as propagated to the remote system.
    ///
    /// The record is written back otherwise unchanged; in particular its
    /// last-modified timestamp keeps the value of the original write. No-op
    /// if the key does not exist.
    pub fn mark_synced(&self, key: &str) {
        if let Err(e) = self.try_mark_synced(key) {
            tracing::warn!(
                "Failed to mark record as synced: namespace={}, key={}, error={}",
                self.namespace,
                key,
                e
            );
        }
    }

    /// Remove every record in this namespace.
    ///
    /// Keys outside the namespace prefix are left untouched.
    pub fn clear(&self) {
        if let Err(e) = self.try_clear() {
            tracing::warn!(
                "Failed to clear store: namespace={}, error={}",
                self.namespace,
                e
            );
        }
    }

    /// Probe whether the backend is usable.
    ///
    /// Performs a write-then-delete with a throwaway key and returns `false`
    /// on any failure (backend disabled, full, ...) rather than propagating
    /// it.
    pub fn is_available(&self) -> bool {
        let probe_key = self.storage_key(PROBE_KEY);
        let result = self
            .backend
            .set_item(&probe_key, "probe")
            .and_then(|_| self.backend.remove_item(&probe_key));

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    "Backend unavailable: backend={}, error={}",
                    self.backend.name(),
                    e
                );
                false
            }
        }
    }

    fn storage_key(&self, key: &str) -> String {
        build_storage_key(&self.namespace, key)
    }

    fn key_prefix(&self) -> String {
        format!("{}::", self.namespace)
    }

    fn try_save<V: Serialize>(&self, key: &str, value: &V) -> Result<(), StoreError> {
        let record = StorageRecord::new(key, value);
        let document =
            serde_json::to_string(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.set_item(&self.storage_key(key), &document)
    }

    fn try_record<V: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<StorageRecord<V>>, StoreError> {
        let Some(document) = self.backend.get_item(&self.storage_key(key))? else {
            return Ok(None);
        };

        let record = serde_json::from_str(&document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }

    fn try_unsynced_records(&self) -> Result<Vec<StorageRecord<serde_json::Value>>, StoreError> {
        let mut records = Vec::new();

        for storage_key in self.backend.keys(Some(&self.key_prefix()))? {
            let Some(document) = self.backend.get_item(&storage_key)? else {
                continue;
            };

            match serde_json::from_str::<StorageRecord<serde_json::Value>>(&document) {
                Ok(record) if !record.synced => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "Skipping undecodable record: key={}, error={}",
                        storage_key,
                        e
                    );
                }
            }
        }

        Ok(records)
    }

    fn try_mark_synced(&self, key: &str) -> Result<(), StoreError> {
        let Some(mut record) = self.try_record::<serde_json::Value>(key)? else {
            return Ok(());
        };

        record.synced = true;
        let document =
            serde_json::to_string(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.set_item(&self.storage_key(key), &document)
    }

    fn try_clear(&self) -> Result<(), StoreError> {
        for storage_key in self.backend.keys(Some(&self.key_prefix()))? {
            self.backend.remove_item(&storage_key)?;
        }
        Ok(())
    }
}
