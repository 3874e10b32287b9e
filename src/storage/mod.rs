//! Persistent key-value stores backing snapshot persistence.
//!
//! Two instances exist per application, one durable and one session-scoped.
//! Keys are composite strings unique per (collection, query name), so no
//! locking is needed: last writer wins, and writes for one key only ever
//! originate from that query's own serialized cycles.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;

use crate::error::StoreError;

pub mod snapshot;

/// Which of the two store instances a query persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Durable,
    Session,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Durable => write!(f, "durable"),
            StoreKind::Session => write!(f, "session"),
        }
    }
}

/// Minimal string key-value store contract.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value. `StoreError::QuotaExceeded` signals the store is out of
    /// space; callers recover by clearing it and disabling persistence.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str);

    fn clear(&self);
}

/// In-memory store with an optional byte budget.
///
/// Serves as the default backend and as the quota-exhaustion test double —
/// the budget caps the summed length of all keys and values, roughly how
/// browser storage quotas behave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    byte_budget: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte_budget(byte_budget: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            byte_budget: Some(byte_budget),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        if let Some(budget) = self.byte_budget {
            let current: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if current + key.len() + value.len() > budget {
                return Err(StoreError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a"), Some("1".to_string()));
        store.remove("a");
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn memory_store_enforces_byte_budget() {
        let store = MemoryStore::with_byte_budget(8);
        store.set("ab", "cd").unwrap();
        let err = store.set("wont", "fit here").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded));
        // Overwriting an existing key only counts the new value.
        store.set("ab", "efgh").unwrap();
    }

    #[test]
    fn clear_empties_the_store() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.clear();
        assert!(store.is_empty());
    }
}
