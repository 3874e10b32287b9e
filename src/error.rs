use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Invalid or missing configuration. Fatal to the operation that hit it —
/// surfaced to the caller and never retried automatically.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error(
        "No list id is configured for environment \"{environment}\". \
         Confirm that the list \"{list}\" has an entry for this environment."
    )]
    MissingEnvironment { environment: String, list: String },

    #[error("run_once is only supported for full-replace queries")]
    RunOnceRequiresFullReplace,
}

// ---------------------------------------------------------------------------
// RemoteError
// ---------------------------------------------------------------------------

/// Remote fetch failure (wraps arbitrary error strings from the data source).
#[derive(Debug, Clone, Error)]
#[error("Remote fetch failed: {message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Persistence failure. Recovered locally (store cleared, persistence
/// disabled) — never surfaces through a cycle handle.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// A raw record that cannot be turned into an entity.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("Record has no usable numeric id")]
    MissingId,
}

// ---------------------------------------------------------------------------
// CycleError
// ---------------------------------------------------------------------------

/// Failure of one sync cycle, delivered through the cycle handle. Cloneable
/// because every caller holding the handle observes the same outcome.
#[derive(Debug, Clone, Error)]
pub enum CycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Query was dropped before the cycle resolved")]
    Dropped,
}

// ---------------------------------------------------------------------------
// ListSyncError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ListSyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// Convenience alias — the default error type is `ListSyncError`.
pub type Result<T, E = ListSyncError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
