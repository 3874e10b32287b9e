//! QueryRegistry lookup and replacement semantics.

use std::sync::Arc;

use async_trait::async_trait;

use listsync::error::RemoteError;
use listsync::query::{QueryOptions, QueryRegistry};
use listsync::storage::MemoryStore;
use listsync::{ChangeBatch, List, ListConfig, QuerySpec, RemoteDataSource, SyncConfig, SyncQuery};

struct NullSource;

#[async_trait]
impl RemoteDataSource for NullSource {
    async fn fetch(&self, _spec: &QuerySpec) -> Result<ChangeBatch, RemoteError> {
        Ok(ChangeBatch::default())
    }
}

fn query(name: &str) -> Arc<SyncQuery> {
    let list = Arc::new(List::new(ListConfig {
        title: "Projects".to_string(),
        guid: "{proj-guid}".to_string(),
        ..Default::default()
    }));
    SyncQuery::new(
        list,
        Arc::new(NullSource),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(SyncConfig::default()),
        QueryOptions {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .unwrap()
}

#[test]
fn register_and_get_by_list_and_name() {
    let registry = QueryRegistry::new();
    assert!(registry.is_empty());

    registry.register("{proj-guid}", query("primary"));
    registry.register("{proj-guid}", query("recent"));
    assert_eq!(registry.len(), 2);

    let found = registry.get("{proj-guid}", "recent").unwrap();
    assert_eq!(found.name(), "recent");
    assert!(registry.get("{proj-guid}", "missing").is_none());
    assert!(registry.get("{other-guid}", "primary").is_none());
}

#[test]
fn register_replaces_and_returns_the_previous_query() {
    let registry = QueryRegistry::new();
    let first = query("primary");
    assert!(registry.register("{proj-guid}", Arc::clone(&first)).is_none());

    let replaced = registry.register("{proj-guid}", query("primary")).unwrap();
    assert!(Arc::ptr_eq(&replaced, &first));
    assert_eq!(registry.len(), 1);
}

#[test]
fn remove_and_clear() {
    let registry = QueryRegistry::new();
    registry.register("{proj-guid}", query("primary"));

    let removed = registry.remove("{proj-guid}", "primary").unwrap();
    assert_eq!(removed.name(), "primary");
    assert!(registry.remove("{proj-guid}", "primary").is_none());

    registry.register("{proj-guid}", query("primary"));
    registry.register("{proj-guid}", query("recent"));
    registry.clear();
    assert!(registry.is_empty());
}
