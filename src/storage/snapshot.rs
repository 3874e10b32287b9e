//! QuerySnapshot — a persisted copy of one query's cache plus its sync
//! metadata, written under the composite key `"<listId>.query.<name>"`.
//!
//! A stored snapshot is either absent, fresh, or expired. Expired snapshots
//! are purged before use, never silently reused; malformed snapshots behave
//! exactly like absent ones.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::IndexedCache;
use crate::error::StoreError;
use crate::storage::{KeyValueStore, StoreKind};
use crate::types::RawRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySnapshot {
    /// Change-stream cursor at the time the snapshot was taken.
    pub change_token: Option<String>,
    /// Completion time of the cycle that produced the snapshot (ISO 8601 on
    /// the wire).
    pub last_run: DateTime<Utc>,
    /// Raw records keyed by stringified entity id.
    pub indexed_cache: BTreeMap<String, RawRecord>,
}

impl QuerySnapshot {
    /// Capture the current cache contents for persistence.
    pub fn capture(
        cache: &IndexedCache,
        change_token: Option<String>,
        last_run: DateTime<Utc>,
    ) -> Self {
        let indexed_cache = cache
            .iter()
            .map(|entity| (entity.id.to_string(), entity.to_raw()))
            .collect();
        Self {
            change_token,
            last_run,
            indexed_cache,
        }
    }

    /// Read and deserialize a snapshot. Absent or malformed payloads both
    /// yield `None`; malformed ones are logged and left for `purge`.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Option<Self> {
        let payload = store.get(key)?;
        match serde_json::from_str(&payload) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::warn!(key, %error, "discarding malformed snapshot");
                None
            }
        }
    }

    /// Serialize and write the snapshot.
    ///
    /// Returns `false` when the store rejected the write (quota) or the
    /// snapshot failed to serialize. In that case the target store has been
    /// cleared to recover space and the caller should disable persistence for
    /// the remainder of the session rather than retry.
    pub fn save(&self, store: &dyn KeyValueStore, kind: StoreKind, key: &str) -> bool {
        let result = serde_json::to_string(self)
            .map_err(StoreError::from)
            .and_then(|payload| store.set(key, &payload));
        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    key,
                    store = %kind,
                    %error,
                    "snapshot write failed, clearing store and disabling persistence"
                );
                store.clear();
                false
            }
        }
    }

    /// Whether the snapshot has outlived `expiration_ms`.
    ///
    /// `0` means snapshots never expire. Otherwise the full elapsed
    /// wall-clock duration since `last_run` is compared, so a snapshot from
    /// yesterday is expired even if the two timestamps share a sub-second
    /// remainder.
    pub fn has_expired(&self, expiration_ms: u64) -> bool {
        if expiration_ms == 0 {
            return false;
        }
        let elapsed_ms = Utc::now()
            .signed_duration_since(self.last_run)
            .num_milliseconds();
        elapsed_ms >= 0 && elapsed_ms as u64 >= expiration_ms
    }

    /// Remove the snapshot entirely.
    pub fn purge(store: &dyn KeyValueStore, key: &str) {
        store.remove(key);
    }
}

/// The composite storage key for one (list, query) pair.
pub fn storage_key(list_id: &str, query_name: &str) -> String {
    format!("{list_id}.query.{query_name}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
