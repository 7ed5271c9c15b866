//! Shared utilities for the cache library.

use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

/// Build a composite storage key from namespace and key.
///
/// Format: `{namespace}::{key}`
pub fn build_storage_key<N: Display>(namespace: &N, key: &str) -> String {
    format!("{}::{}", namespace, key)
}

/// Get the current time in milliseconds since UNIX epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}
