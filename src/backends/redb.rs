//! Redb-backed durable backend.
//!
//! Persistent key-value storage using redb with ACID guarantees.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use crate::backend::KvBackend;
use crate::error::StoreError;

/// Table holding the JSON documents.
const RECORDS_TABLE: TableDefinition<'static, &'static str, &'static str> =
    TableDefinition::new("records");

/// Durable file-backed backend.
///
/// Uses redb's ACID guarantees so records survive crashes and unclean
/// shutdowns. `RedbBackend` is `Clone` and can be shared across threads; the
/// underlying database handles concurrent access safely.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create a database at the given path.
    ///
    /// Creates parent directories if needed and initializes the table so the
    /// first read on a fresh file does not fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Self::err("", e))?;
        }

        let db = Database::create(path).map_err(|e| Self::err("", e))?;

        let write_txn = db.begin_write().map_err(|e| Self::err("", e))?;
        {
            let _table = write_txn
                .open_table(RECORDS_TABLE)
                .map_err(|e| Self::err("", e))?;
        }
        write_txn.commit().map_err(|e| Self::err("", e))?;

        Ok(RedbBackend { db: Arc::new(db) })
    }

    fn err(key: &str, e: impl Display) -> StoreError {
        StoreError::backend("redb", key, e.to_string())
    }
}

impl KvBackend for RedbBackend {
    fn name(&self) -> &'static str {
        "redb"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let read_txn = self.db.begin_read().map_err(|e| Self::err(key, e))?;
        let table = read_txn
            .open_table(RECORDS_TABLE)
            .map_err(|e| Self::err(key, e))?;

        let result = table.get(key).map_err(|e| Self::err(key, e))?;
        Ok(result.map(|guard| guard.value().to_string()))
    }

    fn set_item(&self, key: &str, document: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(|e| Self::err(key, e))?;
        {
            let mut table = write_txn
                .open_table(RECORDS_TABLE)
                .map_err(|e| Self::err(key, e))?;
            table.insert(key, document).map_err(|e| Self::err(key, e))?;
        }
        write_txn.commit().map_err(|e| Self::err(key, e))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(|e| Self::err(key, e))?;
        {
            let mut table = write_txn
                .open_table(RECORDS_TABLE)
                .map_err(|e| Self::err(key, e))?;
            table.remove(key).map_err(|e| Self::err(key, e))?;
        }
        write_txn.commit().map_err(|e| Self::err(key, e))?;
        Ok(())
    }

    fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StoreError> {
        let read_txn = self.db.begin_read().map_err(|e| Self::err("", e))?;
        let table = read_txn
            .open_table(RECORDS_TABLE)
            .map_err(|e| Self::err("", e))?;

        let mut keys = Vec::new();
        for item in table.iter().map_err(|e| Self::err("", e))? {
            let (key, _value) = item.map_err(|e| Self::err("", e))?;
            let key_str = key.value();

            if let Some(prefix) = prefix
                && !key_str.starts_with(prefix)
            {
                continue;
            }

            keys.push(key_str.to_string());
        }

        Ok(keys)
    }
}
