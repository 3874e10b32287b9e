//! QueryOptions — explicit per-query configuration.
//!
//! Every recognized option is enumerated here with its default; there is no
//! dynamic option merging. Validation happens once, when the query is built.

use crate::error::ConfigError;
use crate::types::{EntityId, OperationMode};

/// Records come back ordered ascending by id unless the caller supplies a
/// different expression.
pub const DEFAULT_QUERY: &str =
    "<Query><OrderBy><FieldRef Name=\"ID\" Ascending=\"TRUE\"/></OrderBy></Query>";

/// Where, if anywhere, this query persists snapshots. Durable and session
/// storage are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistenceMode {
    #[default]
    None,
    Durable,
    Session,
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Identifies this query among the queries registered for one list.
    pub name: String,
    pub operation: OperationMode,
    /// Filter/order expression passed through to the remote source.
    pub query: String,
    /// Overrides the list's generated view-field projection.
    pub view_fields: Option<String>,
    /// Maximum records per fetch; `None` returns all.
    pub row_limit: Option<u32>,
    /// Request a single record by id.
    pub entity_id: Option<EntityId>,
    /// Full-replace only: fetch once and serve the cached result on every
    /// later call for the rest of the session.
    pub run_once: bool,
    /// Ignore any stored snapshot and go straight to the server.
    pub force: bool,
    pub persistence: PersistenceMode,
    /// Snapshot expiration for this query; `None` uses the deployment
    /// default, `0` never expires.
    pub expiration_ms: Option<u64>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            name: "primary".to_string(),
            operation: OperationMode::Incremental,
            query: DEFAULT_QUERY.to_string(),
            view_fields: None,
            row_limit: None,
            entity_id: None,
            run_once: false,
            force: false,
            persistence: PersistenceMode::None,
            expiration_ms: None,
        }
    }
}

impl QueryOptions {
    /// Check option combinations that cannot work together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run_once && self.operation == OperationMode::Incremental {
            return Err(ConfigError::RunOnceRequiresFullReplace);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
