use crate::error::StoreError;

/// A backend is a common interface over the shared local key-value store.
///
/// Backends store JSON documents as strings under plain string keys. They are
/// deliberately synchronous: store operations must complete without
/// suspending, and callers above this seam never hold a lock across one.
///
/// Several components may share one backend; key namespacing is the caller's
/// responsibility (see [`OfflineStore`](crate::OfflineStore)).
pub trait KvBackend: Send + Sync + 'static {
    /// A name for log lines.
    ///
    /// # Example
    /// - "memory"
    /// - "redb"
    fn name(&self) -> &'static str;

    /// Return the document stored under `key`.
    ///
    /// The response must be `None` for missing keys.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `document` under `key`, overwriting any existing value.
    fn set_item(&self, key: &str, document: &str) -> Result<(), StoreError>;

    /// Remove `key`. Idempotent; removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// List keys, optionally restricted to those starting with `prefix`.
    ///
    /// Iteration order is implementation-defined and not guaranteed stable.
    fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StoreError>;
}
