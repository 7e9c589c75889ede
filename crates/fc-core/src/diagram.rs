//! The depth-ordered entity store.
//!
//! `Diagram` exclusively owns every entity. Position in the list is the
//! z-order: the last entity is drawn on top and wins hit tests. Every
//! structural change re-runs [`Diagram::reindex`], so `depth` is always a
//! dense `0..len` permutation matching list position.

use crate::id::EntityId;
use crate::model::Entity;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Diagram {
    entities: Vec<Entity>,
    /// EntityId → position in `entities`.
    index: HashMap<EntityId, usize>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index.get(&id).map(|&i| &mut self.entities[i])
    }

    /// Entities back-to-front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// IDs back-to-front.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    /// Append on top of the draw order.
    pub fn push(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        self.reindex();
        id
    }

    /// Remove an entity plus every connector attached to it.
    /// Returns the removed IDs (empty if `id` was unknown).
    pub fn remove(&mut self, id: EntityId) -> Vec<EntityId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut removed = Vec::new();
        self.entities.retain(|e| {
            let attached = e.as_connector().is_some_and(|c| c.references(id));
            if e.id == id || attached {
                removed.push(e.id);
                false
            } else {
                true
            }
        });
        self.reindex();
        log::debug!("removed {removed:?}");
        removed
    }

    /// Move an entity to the end of the draw order.
    /// Returns true if the order changed.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        let Some(&pos) = self.index.get(&id) else {
            return false;
        };
        if pos + 1 == self.entities.len() {
            return false;
        }
        let entity = self.entities.remove(pos);
        self.entities.push(entity);
        self.reindex();
        true
    }

    /// Reassign dense depths and rebuild the ID lookup.
    pub fn reindex(&mut self) {
        self.index.clear();
        for (i, entity) in self.entities.iter_mut().enumerate() {
            entity.depth = i;
            self.index.insert(entity.id, i);
        }
    }
}
