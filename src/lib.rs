//! listsync — change-token synchronization of remote list items into an
//! indexed, locally persisted entity cache.
//!
//! A [`query::SyncQuery`] owns one [`cache::IndexedCache`] and keeps it
//! current against a [`remote::RemoteDataSource`] using the source's change
//! tokens, collapsing overlapping callers onto a single in-flight cycle and
//! optionally persisting snapshots to a [`storage::KeyValueStore`] pair so
//! later sessions start warm.

pub mod cache;
pub mod collection;
pub mod config;
pub mod error;
pub mod permissions;
pub mod query;
pub mod remote;
pub mod storage;
pub mod types;

pub use cache::{IndexedCache, SharedCache};
pub use collection::{List, ListConfig};
pub use config::SyncConfig;
pub use error::{ListSyncError, Result};
pub use query::{CycleHandle, PersistenceMode, QueryOptions, QueryRegistry, SyncQuery};
pub use remote::{QuerySpec, RemoteDataSource};
pub use types::{ChangeBatch, Entity, EntityId, OperationMode, RawRecord};
