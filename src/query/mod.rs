pub mod options;
pub mod registry;
pub mod sync_query;

pub use options::{PersistenceMode, QueryOptions, DEFAULT_QUERY};
pub use registry::QueryRegistry;
pub use sync_query::{CycleHandle, SyncQuery};
