//! IndexedCache — an identity-keyed entity container that preserves insertion
//! order for iteration.
//!
//! Each query owns exactly one cache for the life of the query. Only that
//! query's cycle logic (hydration and reconciliation) mutates it; everything
//! else reads through the shared handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{Entity, EntityId};

/// Shared read handle over a query's cache. Callers awaiting a cycle handle
/// receive one of these once all of the cycle's mutations have been applied.
pub type SharedCache = Arc<RwLock<IndexedCache>>;

#[derive(Debug, Default)]
pub struct IndexedCache {
    entities: HashMap<EntityId, Entity>,
    /// Ids in insertion order. Overwriting an existing id keeps its position.
    order: Vec<EntityId>,
}

impl IndexedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedCache {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Insert or overwrite the entity at its id.
    pub fn insert(&mut self, entity: Entity) {
        let id = entity.id;
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
        }
    }

    /// Remove the entry if present. Absent ids are a no-op, not an error.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(&id);
        if removed.is_some() {
            self.order.retain(|existing| *existing != id);
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// The earliest-inserted entity still present, used to opportunistically
    /// sample permission data off a result set.
    pub fn first(&self) -> Option<&Entity> {
        self.order.first().and_then(|id| self.entities.get(id))
    }

    pub fn count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().copied()
    }
}

impl<'a> IntoIterator for &'a IndexedCache {
    type Item = &'a Entity;
    type IntoIter = Box<dyn Iterator<Item = &'a Entity> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
