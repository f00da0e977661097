//! Key-value storage backends.
//!
//! The rewards store never touches persistence directly; it goes through
//! [`KeyValueStore`], which mirrors the browser's `localStorage` surface:
//! string keys, string values, get/set/remove.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{StoreError, StoreResult};

/// Trait for key-value storage access.
pub trait KeyValueStore: Send + Sync {
    /// Gets the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Checks if a key exists.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-memory key-value store for testing.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryKeyValueStore {
    /// Creates a new, unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once keys and values together
    /// exceed `bytes`, like a browser storage quota.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(bytes),
        }
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
        StoreError::backend(format!("Lock poisoned: {}", e))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(Self::poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(Self::poisoned)?;

        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(Self::poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyValueStore::new();

        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("value".to_string()));
        assert!(store.contains("key").unwrap());
        assert!(!store.contains("missing").unwrap());

        store.remove("key").unwrap();
        assert!(store.is_empty());

        // Removing again is fine
        store.remove("key").unwrap();
    }

    #[test]
    fn test_quota_exceeded() {
        let store = MemoryKeyValueStore::with_quota(16);

        store.set("a", "0123456789").unwrap();
        let err = store.set("b", "0123456789").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));

        // Overwriting the same key only counts the new value
        store.set("a", "01234567890123").unwrap();
        assert_eq!(store.len(), 1);
    }
}
