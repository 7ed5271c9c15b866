use serde::{Deserialize, Serialize};

use crate::utils::now_ms;

/// A record persisted through [`OfflineStore`](crate::OfflineStore).
///
/// Stored on the wire as a JSON object with camelCase field names:
/// `{ "id": ..., "value": ..., "lastModified": ..., "synced": ... }`.
/// The value is opaque to the store; it only needs to serialize to JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRecord<V> {
    /// Identifier, unique within the store's namespace.
    pub id: String,

    /// The stored payload.
    pub value: V,

    /// Unix timestamp in milliseconds of the last write.
    pub last_modified: i64,

    /// Whether this record has been propagated to the remote system of record.
    /// `false` on every write until explicitly marked.
    pub synced: bool,
}

impl<V> StorageRecord<V> {
    /// Create a record stamped with the current time and not yet synced.
    pub fn new(id: impl Into<String>, value: V) -> Self {
        StorageRecord {
            id: id.into(),
            value,
            last_modified: now_ms(),
            synced: false,
        }
    }
}
