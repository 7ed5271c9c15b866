//! Backend implementations for the offline store.

pub mod memory;
pub mod redb;
