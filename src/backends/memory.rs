use std::collections::HashMap;
use std::sync::RwLock;

use crate::backend::KvBackend;
use crate::error::StoreError;

/// In-memory backend using a HashMap behind an RwLock.
///
/// Suitable for tests, development, and embedded use. All data is lost when
/// the process exits; use [`RedbBackend`](crate::RedbBackend) where
/// durability is required.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        MemoryBackend {
            state: RwLock::new(HashMap::new()),
        }
    }
}

impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::backend("memory", key, "lock poisoned"))?;
        Ok(state.get(key).cloned())
    }

    fn set_item(&self, key: &str, document: &str) -> Result<(), StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::backend("memory", key, "lock poisoned"))?;
        state.insert(key.to_string(), document.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::backend("memory", key, "lock poisoned"))?;
        state.remove(key);
        Ok(())
    }

    fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::backend("memory", "", "lock poisoned"))?;

        Ok(state
            .keys()
            .filter(|key| prefix.is_none_or(|p| key.starts_with(p)))
            .cloned()
            .collect())
    }
}
