//! QueryRegistry — an explicit registry of queries keyed by (list id, query
//! name), owned by the embedding application and torn down with it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::query::sync_query::SyncQuery;

#[derive(Default)]
pub struct QueryRegistry {
    queries: Mutex<HashMap<(String, String), Arc<SyncQuery>>>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a query under its (list id, name) pair, replacing and
    /// returning any query previously registered there.
    pub fn register(&self, list_id: &str, query: Arc<SyncQuery>) -> Option<Arc<SyncQuery>> {
        let key = (list_id.to_string(), query.name().to_string());
        self.queries.lock().insert(key, query)
    }

    pub fn get(&self, list_id: &str, name: &str) -> Option<Arc<SyncQuery>> {
        self.queries
            .lock()
            .get(&(list_id.to_string(), name.to_string()))
            .cloned()
    }

    pub fn remove(&self, list_id: &str, name: &str) -> Option<Arc<SyncQuery>> {
        self.queries
            .lock()
            .remove(&(list_id.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.queries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.lock().is_empty()
    }

    /// Drop every registered query.
    pub fn clear(&self) {
        self.queries.lock().clear();
    }
}
