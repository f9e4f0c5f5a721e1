//! The top-level dispatcher: consumes decoded server batches and applies them
//! to the region store and entity table.
//!
//! Batches are applied in a fixed order: unsubscribes, then subscribes (each
//! as an atomic region-plus-entities block), then tile records, then entity
//! records. This ordering guarantees no record ever references a region that
//! has not been created yet, and no tile write lands in a region about to be
//! dropped.
//!
//! Side effects the embedding application must react to are queued as
//! [`WorldEvent`]s and drained once per frame.

use log::{debug, warn};

use meadow_shared::{
    ByteReader, EntityId, EntityUpdate, GameInstant, PlayerFlags, Pose, RegionCoord,
    RegionPayload, StateFlags, TileType, UpdateRecord, WireError, WireSerde, WorldUpdate,
};

use crate::interfaces::{MaskNameFilter, NameFilter};
use crate::sync::config::SyncConfig;
use crate::sync::event::WorldEvent;
use crate::sync::orphan::OrphanChat;
use crate::sync::party::{FriendList, PartyList};
use crate::sync::scheduler::{DeferredAction, Scheduler};
use crate::sync::selection::Selection;
use crate::world::entity::Entity;
use crate::world::entity_table::EntityTable;
use crate::world::region_store::RegionStore;

/// How far the resting-collision resolver searches for open ground, in tiles.
const COLLISION_SEARCH_RADIUS: i32 = 4;

/// The player's pending local predictions. Each is asserted at the moment the
/// player acts and wins over exactly one subsequent server state echo, after
/// which the server value is authoritative again.
#[derive(Default)]
struct LocalOverrides {
    pose: Option<Pose>,
    facing: Option<bool>,
    head_turn: Option<bool>,
}

struct FieldOutcome {
    clear_selection: bool,
}

pub struct SyncReconciler {
    config: SyncConfig,
    player_id: Option<EntityId>,
    scheduler: Scheduler,
    selection: Selection,
    friends: FriendList,
    party: PartyList,
    orphans: OrphanChat,
    events: Vec<WorldEvent>,
    overrides: LocalOverrides,
    name_filter: Box<dyn NameFilter>,
}

impl SyncReconciler {
    pub fn new(config: SyncConfig, name_filter: Box<dyn NameFilter>) -> Self {
        Self {
            config,
            player_id: None,
            scheduler: Scheduler::new(),
            selection: Selection::new(),
            friends: FriendList::new(),
            party: PartyList::new(),
            orphans: OrphanChat::new(),
            events: Vec::new(),
            overrides: LocalOverrides::default(),
            name_filter,
        }
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player_id
    }

    /// The locally-known player id; the matching entity becomes controllable
    /// the moment its `AddEntity` arrives.
    pub fn set_player_id(&mut self, id: EntityId) {
        self.player_id = Some(id);
    }

    pub fn friends(&self) -> &FriendList {
        &self.friends
    }

    pub fn friends_mut(&mut self) -> &mut FriendList {
        &mut self.friends
    }

    pub fn party(&self) -> &PartyList {
        &self.party
    }

    pub fn party_mut(&mut self) -> &mut PartyList {
        &mut self.party
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selection.current()
    }

    /// Two-tier selection resolve: live table first, soft-alive ghost second.
    pub fn resolve_selected<'a>(&'a self, entities: &'a EntityTable) -> Option<&'a Entity> {
        self.selection.resolve(entities)
    }

    pub fn select_entity(&mut self, id: EntityId) {
        self.selection.select(id, &mut self.scheduler);
        self.events.push(WorldEvent::SelectionChanged(Some(id)));
    }

    pub fn deselect_entity(&mut self) {
        self.selection.deselect(&mut self.scheduler);
        self.events.push(WorldEvent::SelectionChanged(None));
    }

    /// Number of not-yet-fired deferred actions, exposed for diagnostics.
    pub fn pending_deferred(&self) -> usize {
        self.scheduler.len()
    }

    /// Drains the events produced since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Decodes and applies one inbound batch. A decode failure abandons the
    /// whole batch before anything is applied; the connection layer decides
    /// whether it warrants a disconnect.
    pub fn apply_buffer(
        &mut self,
        bytes: &[u8],
        store: &mut RegionStore,
        entities: &mut EntityTable,
        now: GameInstant,
    ) -> Result<(), WireError> {
        let mut reader = ByteReader::new(bytes);
        let update = WorldUpdate::de(&mut reader)?;
        self.apply(update, store, entities, now);
        Ok(())
    }

    /// Applies one decoded batch in the fixed order: unsubscribes,
    /// subscribes, tile records, entity records.
    pub fn apply(
        &mut self,
        update: WorldUpdate,
        store: &mut RegionStore,
        entities: &mut EntityTable,
        now: GameInstant,
    ) {
        for coord in update.unsubscribes {
            self.unsubscribe_region(coord, store, entities, now);
        }
        for payload in update.subscribes {
            self.subscribe_region(payload, store, entities, now);
        }
        for record in &update.records {
            if let UpdateRecord::UpdateTile { x, y, tile } = record {
                self.update_tile(*x, *y, *tile, store);
            }
        }
        for record in update.records {
            match record {
                UpdateRecord::AddEntity(entity_update) => {
                    self.add_entity(entity_update, store, entities, now);
                }
                UpdateRecord::UpdateEntity(entity_update) => {
                    self.update_entity(entity_update, store, entities, now);
                }
                UpdateRecord::RemoveEntity(id) => {
                    self.remove_entity(id, store, entities, now);
                }
                UpdateRecord::UpdateTile { .. } => {} // applied in the tile pass
            }
        }
    }

    /// Applies a region snapshot as a batch: create the region, write the
    /// tile data, then the contained entities in order, so no entity is ever
    /// visible without its region existing.
    fn subscribe_region(
        &mut self,
        payload: RegionPayload,
        store: &mut RegionStore,
        entities: &mut EntityTable,
        now: GameInstant,
    ) {
        store.insert_region(payload.coord, &payload.tiles);
        for entity_update in payload.entities {
            self.add_entity(entity_update, store, entities, now);
        }
    }

    /// Drops a region and every entity whose sole membership it was,
    /// synchronously cancelling their pending deferred actions. Party and
    /// friend records are non-spatial and survive.
    fn unsubscribe_region(
        &mut self,
        coord: RegionCoord,
        store: &mut RegionStore,
        entities: &mut EntityTable,
        now: GameInstant,
    ) {
        let Some(evicted) = store.remove_region(coord) else {
            if cfg!(debug_assertions) {
                debug!("unsubscribe for unknown region ({}, {})", coord.x, coord.y);
            }
            return;
        };
        for id in evicted {
            self.scheduler.cancel_owned(id);
            let Some(entity) = entities.remove(id) else {
                continue;
            };
            self.friends.unbind_entity(id);
            if self.selection.current() == Some(id) {
                self.selection.on_entity_removed(
                    entity,
                    &mut self.scheduler,
                    now,
                    self.config.selection_grace,
                );
            }
            self.events.push(WorldEvent::EntityRemoved(id));
        }
    }

    fn add_entity(
        &mut self,
        update: EntityUpdate,
        store: &mut RegionStore,
        entities: &mut EntityTable,
        now: GameInstant,
    ) {
        let id = update.id;
        let Some(kind) = update.kind else {
            if cfg!(debug_assertions) {
                debug!("add for entity {id} without a kind, skipped");
            }
            return;
        };

        let mut entity = Entity::new(id, kind, update.x.unwrap_or(0.0), update.y.unwrap_or(0.0));
        if let Some(vx) = update.vx {
            entity.vx = vx;
        }
        if let Some(vy) = update.vy {
            entity.vy = vy;
        }
        if let Some(state) = update.state {
            entity.state = state;
        }
        if let Some(player_state) = update.player_state {
            entity.player_state = player_state;
        }
        if let Some(appearance) = update.appearance {
            entity.set_appearance(appearance);
        }
        if let Some(crc) = update.crc {
            entity.crc = Some(crc);
        }
        if let Some(raw) = &update.name {
            let flagged = entity.player_state.contains(PlayerFlags::BAD_NAME);
            entity.name = Some(self.name_filter.filter_name(raw, flagged));
        }

        if self.player_id == Some(id) {
            // the local player must never interact with itself, and must not
            // spawn resting inside a solid tile
            entity.interactive = false;
            resolve_resting_collision(&mut entity, store);
        }

        // a re-add replaces any stale instance wholesale
        if let Some(stale) = entities.remove(id) {
            store.remove_entity(id, stale.x, stale.y);
        }
        if store.add_entity(id, entity.x, entity.y).is_none() && cfg!(debug_assertions) {
            debug!("entity {id} added outside any subscribed region");
        }

        self.party.refresh_from(&entity);
        self.friends.refresh_from(&entity);
        let action = update.action;
        entities.insert(entity);

        self.selection.on_entity_added(id, &mut self.scheduler);
        self.events.push(WorldEvent::EntityAdded(id));
        for text in self.orphans.flush(id, &mut self.scheduler) {
            self.events.push(WorldEvent::Chat { id, text });
        }
        if let Some(code) = action {
            self.events.push(WorldEvent::Action { id, code });
        }
    }

    fn update_entity(
        &mut self,
        update: EntityUpdate,
        store: &mut RegionStore,
        entities: &mut EntityTable,
        now: GameInstant,
    ) {
        let id = update.id;
        let is_player = self.player_id == Some(id);
        let in_table = entities.contains(id);
        if !in_table && !self.selection.is_ghost(id) {
            // expected during subscribe/unsubscribe race windows
            if cfg!(debug_assertions) {
                debug!("update for unknown entity {id}, skipped");
            }
            return;
        }

        let selected = self.selection.current();
        let outcome = if in_table {
            self.apply_position(&update, store, entities, is_player);
            let entity = entities.get_mut(id).expect("presence checked above");
            apply_entity_fields(
                &update,
                entity,
                is_player,
                &mut self.overrides,
                self.name_filter.as_ref(),
                &mut self.scheduler,
                selected,
                &self.config,
                &mut self.events,
                now,
            )
        } else {
            // eviction-race fallback: the soft-alive selection ghost takes
            // the update so a re-add does not revive stale fields
            let entity = self
                .selection
                .ghost_mut(id)
                .expect("ghost checked above");
            if let Some(x) = update.x {
                entity.x = x;
            }
            if let Some(y) = update.y {
                entity.y = y;
            }
            if let Some(vx) = update.vx {
                entity.vx = vx;
            }
            if let Some(vy) = update.vy {
                entity.vy = vy;
            }
            apply_entity_fields(
                &update,
                entity,
                is_player,
                &mut self.overrides,
                self.name_filter.as_ref(),
                &mut self.scheduler,
                selected,
                &self.config,
                &mut self.events,
                now,
            )
        };

        if outcome.clear_selection {
            self.selection.deselect(&mut self.scheduler);
            self.events.push(WorldEvent::SelectionChanged(None));
        }
        if in_table {
            if let Some(entity) = entities.get(id) {
                self.party.refresh_from(entity);
                self.friends.refresh_from(entity);
            }
        }
    }

    /// Position/velocity reconciliation for a table-resident entity.
    ///
    /// Non-player entities take the server value directly. The player's
    /// position is client-predicted: server corrections below the drift
    /// threshold are ignored, and only a genuine desync (at or beyond it)
    /// snaps the prediction to the server value. A switch-region update is
    /// always authoritative.
    fn apply_position(
        &mut self,
        update: &EntityUpdate,
        store: &mut RegionStore,
        entities: &mut EntityTable,
        is_player: bool,
    ) {
        let id = update.id;
        if update.x.is_none() && update.y.is_none() {
            if !is_player {
                if let Some(entity) = entities.get_mut(id) {
                    if let Some(vx) = update.vx {
                        entity.vx = vx;
                    }
                    if let Some(vy) = update.vy {
                        entity.vy = vy;
                    }
                }
            }
            return;
        }

        let (current_x, current_y) = {
            let entity = entities.get(id).expect("caller checked presence");
            (entity.x, entity.y)
        };
        let new_x = update.x.unwrap_or(current_x);
        let new_y = update.y.unwrap_or(current_y);

        if is_player && !update.switch_region {
            let drift = ((new_x - current_x).powi(2) + (new_y - current_y).powi(2)).sqrt();
            if drift < self.config.drift_threshold {
                return;
            }
            if cfg!(debug_assertions) {
                warn!("player {id} drifted {drift:.2} tiles from server value, snapping");
            }
        }

        // past this point the server position is authoritative (a plain
        // overwrite, a forced region switch, or a desync snap), and the
        // server velocity comes with it
        entities.transfer(store, id, new_x, new_y);
        if update.vx.is_some() || update.vy.is_some() {
            let entity = entities.get_mut(id).expect("just transferred");
            if let Some(vx) = update.vx {
                entity.vx = vx;
            }
            if let Some(vy) = update.vy {
                entity.vy = vy;
            }
        }
    }

    fn remove_entity(
        &mut self,
        id: EntityId,
        store: &mut RegionStore,
        entities: &mut EntityTable,
        now: GameInstant,
    ) {
        let Some(entity) = entities.remove(id) else {
            if cfg!(debug_assertions) {
                debug!("remove for unknown entity {id}, skipped");
            }
            return;
        };
        store.remove_entity(id, entity.x, entity.y);
        self.scheduler.cancel_owned(id);
        self.friends.unbind_entity(id);

        if entity.is_character() && !entity.is_hidden() {
            self.events.push(WorldEvent::DespawnEffect {
                id,
                x: entity.x,
                y: entity.y,
            });
        }
        if self.selection.current() == Some(id) {
            self.selection.on_entity_removed(
                entity,
                &mut self.scheduler,
                now,
                self.config.selection_grace,
            );
        }
        self.events.push(WorldEvent::EntityRemoved(id));
    }

    fn update_tile(&mut self, x: u16, y: u16, tile: TileType, store: &mut RegionStore) {
        if !store.set_tile(x as i32, y as i32, tile) && cfg!(debug_assertions) {
            debug!("tile update ({x}, {y}) for an unsubscribed region, skipped");
        }
    }

    /// A chat line addressed to an entity id. Lines for ids not yet known
    /// are buffered until the entity appears or the expiry passes.
    pub fn receive_chat(
        &mut self,
        id: EntityId,
        text: String,
        entities: &EntityTable,
        now: GameInstant,
    ) {
        if entities.contains(id) {
            self.events.push(WorldEvent::Chat { id, text });
            return;
        }
        let handle = self.scheduler.schedule(
            now,
            self.config.orphan_expiry,
            None,
            DeferredAction::ExpireOrphanChat { id },
        );
        self.orphans.push(id, text, handle);
    }

    /// The per-frame pump: fires due deferred actions.
    pub fn tick(&mut self, now: GameInstant, entities: &mut EntityTable) {
        for action in self.scheduler.poll(now) {
            match action {
                DeferredAction::ApplyAppearance {
                    id,
                    appearance,
                    crc,
                } => {
                    if let Some(entity) = entities.get_mut(id) {
                        entity.set_appearance(appearance);
                        if crc.is_some() {
                            entity.crc = crc;
                        }
                    }
                }
                DeferredAction::ClearSelection { id } => {
                    if self.selection.finalize_clear(id) {
                        self.events.push(WorldEvent::SelectionChanged(None));
                    }
                }
                DeferredAction::ExpireOrphanChat { id } => {
                    self.orphans.expire_oldest(id);
                }
            }
        }
    }

    // --- local input surface ------------------------------------------------
    //
    // Input handling writes predictions here during the frame; the next
    // reconciliation pass consumes each override exactly once.

    /// Asserts a pose locally. Wins over one subsequent server state echo.
    pub fn set_pose_override(&mut self, pose: Pose, entities: &mut EntityTable) {
        self.overrides.pose = Some(pose);
        if let Some(entity) = self.player_entity_mut(entities) {
            entity.state.set_pose(pose);
        }
    }

    /// Asserts facing locally. Wins over one subsequent server state echo.
    pub fn set_facing_override(&mut self, facing_right: bool, entities: &mut EntityTable) {
        self.overrides.facing = Some(facing_right);
        if let Some(entity) = self.player_entity_mut(entities) {
            entity.state.set(StateFlags::FACING_RIGHT, facing_right);
        }
    }

    /// Asserts head turn locally. Wins over one subsequent server state echo.
    pub fn set_head_turn_override(&mut self, turned: bool, entities: &mut EntityTable) {
        self.overrides.head_turn = Some(turned);
        if let Some(entity) = self.player_entity_mut(entities) {
            entity.state.set(StateFlags::HEAD_TURNED, turned);
        }
    }

    /// Writes the client-predicted player position, keeping region
    /// membership consistent.
    pub fn predict_player_position(
        &mut self,
        x: f32,
        y: f32,
        store: &mut RegionStore,
        entities: &mut EntityTable,
    ) {
        if let Some(id) = self.player_id {
            entities.transfer(store, id, x, y);
        }
    }

    fn player_entity_mut<'a>(&self, entities: &'a mut EntityTable) -> Option<&'a mut Entity> {
        entities.get_mut(self.player_id?)
    }
}

impl Default for SyncReconciler {
    fn default() -> Self {
        Self::new(SyncConfig::default(), Box::new(MaskNameFilter))
    }
}

/// Pushes a spawned entity out of overlapping solid tiles, searching rings of
/// increasing radius for the nearest open ground. Leaves the position alone
/// when the ground is already passable or nothing opens up within range.
fn resolve_resting_collision(entity: &mut Entity, store: &RegionStore) {
    let tile_x = entity.x.floor() as i32;
    let tile_y = entity.y.floor() as i32;
    if store
        .tile_at(tile_x, tile_y)
        .map(TileType::is_passable)
        .unwrap_or(true)
    {
        // unloaded ground is left alone; the subscribe batch will place it
        return;
    }
    for radius in 1..=COLLISION_SEARCH_RADIUS {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let candidate_x = tile_x + dx;
                let candidate_y = tile_y + dy;
                if store
                    .tile_at(candidate_x, candidate_y)
                    .map(TileType::is_passable)
                    .unwrap_or(false)
                {
                    entity.x = candidate_x as f32 + 0.5;
                    entity.y = candidate_y as f32 + 0.5;
                    return;
                }
            }
        }
    }
}

fn apply_entity_fields(
    update: &EntityUpdate,
    entity: &mut Entity,
    is_player: bool,
    overrides: &mut LocalOverrides,
    name_filter: &dyn NameFilter,
    scheduler: &mut Scheduler,
    selected: Option<EntityId>,
    config: &SyncConfig,
    events: &mut Vec<WorldEvent>,
    now: GameInstant,
) -> FieldOutcome {
    let mut outcome = FieldOutcome {
        clear_selection: false,
    };

    if let Some(server_state) = update.state {
        let mut state = server_state;
        if is_player {
            // consume each pending local override exactly once
            if let Some(pose) = overrides.pose.take() {
                state.set_pose(pose);
            }
            if let Some(facing) = overrides.facing.take() {
                state.set(StateFlags::FACING_RIGHT, facing);
            }
            if let Some(turned) = overrides.head_turn.take() {
                state.set(StateFlags::HEAD_TURNED, turned);
            }
        }
        entity.state = state;
    }

    if let Some(flags) = update.player_state {
        let was_hidden = entity.is_hidden();
        entity.player_state = flags;
        if !was_hidden && entity.is_hidden() {
            events.push(WorldEvent::DespawnEffect {
                id: entity.id,
                x: entity.x,
                y: entity.y,
            });
            if selected == Some(entity.id) {
                outcome.clear_selection = true;
            }
        }
    }

    if let Some(blob) = &update.appearance {
        let changed = match (update.crc, entity.crc) {
            (Some(new), Some(old)) => new != old,
            _ => true,
        };
        if changed {
            if entity.is_hidden() {
                // nothing visible to synchronize an effect with
                entity.set_appearance(blob.clone());
                if update.crc.is_some() {
                    entity.crc = update.crc;
                }
            } else {
                events.push(WorldEvent::TransformEffect { id: entity.id });
                scheduler.schedule(
                    now,
                    config.appearance_swap_delay,
                    Some(entity.id),
                    DeferredAction::ApplyAppearance {
                        id: entity.id,
                        appearance: blob.clone(),
                        crc: update.crc,
                    },
                );
            }
        }
    } else if let Some(crc) = update.crc {
        // hash-only refresh: marks cached renderings stale, nothing to swap
        entity.crc = Some(crc);
    }

    if let Some(raw) = &update.name {
        let flagged = entity.player_state.contains(PlayerFlags::BAD_NAME);
        entity.name = Some(name_filter.filter_name(raw, flagged));
    }

    if let Some(code) = update.action {
        events.push(WorldEvent::Action {
            id: entity.id,
            code,
        });
    }

    outcome
}
