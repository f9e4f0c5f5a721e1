//! Arena of live entities, keyed by server-assigned id.

use std::collections::HashMap;

use meadow_shared::EntityId;

use crate::world::entity::Entity;
use crate::world::region_store::RegionStore;

/// Exclusive owner of every live entity. Spatial membership lives in the
/// [`RegionStore`] as ids, so there are no cyclic references to break.
#[derive(Default)]
pub struct EntityTable {
    entities: HashMap<EntityId, Entity>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.id, entity)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Atomic cross-region move: remove from the old region's membership,
    /// write the position, add to the new region's membership. The entity is
    /// never observable in both lists, and never in neither past this call
    /// (unless the destination region is unsubscribed).
    pub fn transfer(&mut self, store: &mut RegionStore, id: EntityId, x: f32, y: f32) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        store.remove_entity(id, entity.x, entity.y);
        entity.x = x;
        entity.y = y;
        store.add_entity(id, x, y);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meadow_shared::{EntityKind, RegionCoord, TileData, TileType};

    #[test]
    fn insert_get_remove() {
        let mut table = EntityTable::new();
        let id = EntityId::new(7);
        table.insert(Entity::new(id, EntityKind::Pony, 1.0, 2.0));
        assert!(table.contains(id));
        assert_eq!(table.get(id).unwrap().x, 1.0);
        assert!(table.remove(id).is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn transfer_moves_membership_atomically() {
        let mut store = RegionStore::new(64, 64);
        store.insert_region(RegionCoord::new(0, 0), &TileData::filled(TileType::Grass));
        store.insert_region(RegionCoord::new(1, 0), &TileData::filled(TileType::Grass));

        let mut table = EntityTable::new();
        let id = EntityId::new(3);
        table.insert(Entity::new(id, EntityKind::Pony, 2.0, 2.0));
        store.add_entity(id, 2.0, 2.0);

        assert!(table.transfer(&mut store, id, 10.0, 2.0));
        assert!(store.region(RegionCoord::new(0, 0)).unwrap().entities().is_empty());
        assert_eq!(
            store.region(RegionCoord::new(1, 0)).unwrap().entities(),
            &[id]
        );
        assert_eq!(table.get(id).unwrap().x, 10.0);
    }
}
