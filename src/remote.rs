//! RemoteDataSource — the user-provided network layer.
//!
//! The engine treats the wire format as opaque: a fetch takes a `QuerySpec`
//! and yields a `ChangeBatch` (records plus an updated change token) or a
//! failure. Timeout semantics belong to the implementation.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::types::{ChangeBatch, EntityId, OperationMode};

/// Everything a remote source needs to answer one fetch.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Resolved collection id for the active environment.
    pub list_id: String,
    /// Service URL override, when the list or deployment supplies one.
    pub web_url: Option<String>,
    /// Field projection to return for each record.
    pub view_fields: String,
    /// Filter/order expression controlling which records come back.
    pub query: String,
    pub mode: OperationMode,
    /// Maximum number of records to return. `None` returns all.
    pub row_limit: Option<u32>,
    /// Restrict the fetch to a single record.
    pub entity_id: Option<EntityId>,
    /// Cursor from the previous incremental cycle; `None` on the first.
    pub change_token: Option<String>,
}

/// User-implemented fetch against the remote tabular source.
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    async fn fetch(&self, spec: &QuerySpec) -> Result<ChangeBatch, RemoteError>;
}
