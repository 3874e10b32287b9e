//! IndexedCache invariants: distinct-id counting, insertion order, and the
//! documented mutation operations.

use serde_json::Map;

use listsync::types::Entity;
use listsync::IndexedCache;

fn entity(id: u32) -> Entity {
    Entity {
        id,
        version: 0,
        perm_mask: None,
        fields: Map::new(),
    }
}

#[test]
fn count_tracks_distinct_ids() {
    let mut cache = IndexedCache::new();
    assert_eq!(cache.count(), 0);

    cache.insert(entity(1));
    cache.insert(entity(2));
    cache.insert(entity(3));
    assert_eq!(cache.count(), 3);

    // Overwriting an existing id must not change the count.
    cache.insert(entity(2));
    assert_eq!(cache.count(), 3);

    cache.remove(2);
    assert_eq!(cache.count(), 2);

    // Removing an absent id is a no-op, not an error.
    cache.remove(99);
    assert_eq!(cache.count(), 2);
}

#[test]
fn iteration_preserves_insertion_order() {
    let mut cache = IndexedCache::new();
    cache.insert(entity(5));
    cache.insert(entity(1));
    cache.insert(entity(9));

    let ids: Vec<u32> = cache.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![5, 1, 9]);

    // The sequence is restartable.
    let again: Vec<u32> = cache.iter().map(|e| e.id).collect();
    assert_eq!(again, ids);
}

#[test]
fn overwrite_keeps_insertion_position() {
    let mut cache = IndexedCache::new();
    cache.insert(entity(5));
    cache.insert(entity(1));

    let mut updated = entity(5);
    updated.version = 7;
    cache.insert(updated);

    let ids: Vec<u32> = cache.ids().collect();
    assert_eq!(ids, vec![5, 1]);
    assert_eq!(cache.get(5).unwrap().version, 7);
}

#[test]
fn first_follows_insertion_order() {
    let mut cache = IndexedCache::new();
    assert!(cache.first().is_none());

    cache.insert(entity(3));
    cache.insert(entity(1));
    assert_eq!(cache.first().unwrap().id, 3);

    cache.remove(3);
    assert_eq!(cache.first().unwrap().id, 1);
}

#[test]
fn clear_empties_everything() {
    let mut cache = IndexedCache::new();
    cache.insert(entity(1));
    cache.insert(entity(2));
    cache.clear();

    assert_eq!(cache.count(), 0);
    assert!(cache.is_empty());
    assert!(cache.first().is_none());
    assert_eq!(cache.iter().count(), 0);
}
