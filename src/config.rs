//! Application-level sync configuration. Passed by reference to constructors
//! rather than read from ambient state, so the embedding application controls
//! its lifecycle.

/// Settings shared by every query built against one deployment.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Active environment name, used to resolve per-environment list ids.
    pub environment: String,
    /// Default service URL when a list does not carry its own.
    pub default_url: Option<String>,
    /// Minimum spacing between cycle starts for one query. Calls inside the
    /// window receive the previous cycle's handle.
    pub debounce_ms: u64,
    /// Default snapshot expiration. `0` means snapshots never expire.
    pub default_expiration_ms: u64,
    /// When set, snapshots are never written (useful for development against
    /// canned data).
    pub offline: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            default_url: None,
            debounce_ms: 100,
            // One day.
            default_expiration_ms: 86_400_000,
            offline: false,
        }
    }
}
