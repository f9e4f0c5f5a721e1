//! The locally selected entity.
//!
//! When a selected entity is removed, the selection keeps a ghost copy for a
//! short grace window instead of clearing immediately, because regions
//! flicker in and out of subscription at the camera edge and losing the
//! selection on every flicker is jarring. A re-add within the window revives
//! the selection; the grace timer firing finally clears it.

use meadow_shared::{EntityId, GameDuration, GameInstant};

use crate::sync::scheduler::{DeferredAction, Scheduler, TaskHandle};
use crate::world::entity::Entity;
use crate::world::entity_table::EntityTable;

#[derive(Default)]
pub struct Selection {
    current: Option<EntityId>,
    ghost: Option<(Entity, TaskHandle)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    pub fn select(&mut self, id: EntityId, scheduler: &mut Scheduler) {
        self.drop_ghost(scheduler);
        self.current = Some(id);
    }

    pub fn deselect(&mut self, scheduler: &mut Scheduler) {
        self.drop_ghost(scheduler);
        self.current = None;
    }

    fn drop_ghost(&mut self, scheduler: &mut Scheduler) {
        if let Some((_, handle)) = self.ghost.take() {
            scheduler.cancel(handle);
        }
    }

    pub fn is_ghost(&self, id: EntityId) -> bool {
        matches!(&self.ghost, Some((entity, _)) if entity.id == id)
    }

    pub fn ghost_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match &mut self.ghost {
            Some((entity, _)) if entity.id == id => Some(entity),
            _ => None,
        }
    }

    /// Called when the selected entity is removed: keep it soft-alive and
    /// schedule the real clear.
    pub fn on_entity_removed(
        &mut self,
        entity: Entity,
        scheduler: &mut Scheduler,
        now: GameInstant,
        grace: GameDuration,
    ) {
        if self.current != Some(entity.id) {
            return;
        }
        self.drop_ghost(scheduler);
        let handle = scheduler.schedule(
            now,
            grace,
            Some(entity.id),
            DeferredAction::ClearSelection { id: entity.id },
        );
        self.ghost = Some((entity, handle));
    }

    /// Called when an entity appears: a matching ghost means the selection
    /// survived the flicker.
    pub fn on_entity_added(&mut self, id: EntityId, scheduler: &mut Scheduler) {
        if self.is_ghost(id) {
            self.drop_ghost(scheduler);
        }
    }

    /// The grace timer fired. Returns true when the selection was actually
    /// cleared (and the embedding application should be told).
    pub fn finalize_clear(&mut self, id: EntityId) -> bool {
        if self.is_ghost(id) {
            self.ghost = None;
        }
        if self.current == Some(id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Two-tier resolve: the live table first, the soft-alive ghost second.
    pub fn resolve<'a>(&'a self, table: &'a EntityTable) -> Option<&'a Entity> {
        let id = self.current?;
        table.get(id).or_else(|| match &self.ghost {
            Some((entity, _)) if entity.id == id => Some(entity),
            _ => None,
        })
    }
}
