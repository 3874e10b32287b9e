//! Shared data types: entities, raw records, operation modes, and the
//! change batch returned by a remote fetch.

use serde_json::{Map, Value};

/// Stable numeric identity of a list item.
pub type EntityId = u32;

/// An undecoded record as it arrives from the remote source or a persisted
/// snapshot — a flat JSON object keyed by field name.
pub type RawRecord = Map<String, Value>;

/// Which fetch the remote source should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// "Changes since token" — returns only records added/updated/deleted
    /// after the supplied change token. The cache is merged, never cleared.
    Incremental,
    /// "All items" — an authoritative replacement of the cache contents.
    FullReplace,
}

/// A decoded list item. Owned exclusively by the cache that holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Server revision counter for the record.
    pub version: u32,
    /// Raw permission mask carried on the record, when the source returned one.
    pub perm_mask: Option<u64>,
    /// Decoded fields keyed by mapped name.
    pub fields: Map<String, Value>,
}

impl Entity {
    /// Serialize back into the flat record shape that `List::decode` accepts,
    /// used when capturing a snapshot.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = self.fields.clone();
        raw.insert("id".to_string(), Value::from(self.id));
        raw.insert("version".to_string(), Value::from(self.version));
        if let Some(mask) = self.perm_mask {
            raw.entry("permMask".to_string())
                .or_insert_with(|| Value::from(format!("0x{mask:016X}")));
        }
        raw
    }
}

/// One batch of changes from the remote source.
///
/// The engine applies the whole batch before advancing the change token —
/// a batch is never half-applied.
#[derive(Debug, Clone, Default)]
pub struct ChangeBatch {
    /// Added or updated records, undecoded.
    pub records: Vec<RawRecord>,
    /// Ids of records deleted on the server since the supplied token.
    pub deleted: Vec<EntityId>,
    /// Opaque cursor into the server's change stream. `None` leaves the
    /// query's current token in place (full-replace responses carry none).
    pub change_token: Option<String>,
    /// Effective-perm-mask *name* carried on the response's list element
    /// (e.g. `"FullMask"`), when the source returned one. Feeds list
    /// permission resolution ahead of per-record mask sampling.
    pub list_permissions: Option<String>,
}
