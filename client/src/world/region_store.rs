//! The grid of subscribed regions that tiles the world.

use std::collections::HashMap;

use log::debug;

use meadow_shared::{EntityId, RegionCoord, TileData, TileIndex, TileType, REGION_SIZE, REGION_TILES};

use crate::interfaces::ErrorSink;
use crate::world::autotile::{AutotileResolver, NEIGHBOR_OFFSETS};
use crate::world::region::{Region, INDEX_DIRTY};

/// Owns every subscribed [`Region`], keyed by region coordinates, plus the
/// world bounds used to clamp neighborhood lookups at the map edge.
pub struct RegionStore {
    regions: HashMap<RegionCoord, Region>,
    width_tiles: i32,
    height_tiles: i32,
}

impl RegionStore {
    pub fn new(width_tiles: i32, height_tiles: i32) -> Self {
        Self {
            regions: HashMap::new(),
            width_tiles,
            height_tiles,
        }
    }

    pub fn width_tiles(&self) -> i32 {
        self.width_tiles
    }

    pub fn height_tiles(&self) -> i32 {
        self.height_tiles
    }

    /// Region-coordinate bounds (exclusive), derived from the world size.
    pub fn region_bounds(&self) -> (i32, i32) {
        (
            (self.width_tiles + REGION_SIZE - 1) / REGION_SIZE,
            (self.height_tiles + REGION_SIZE - 1) / REGION_SIZE,
        )
    }

    /// Creates a region from a subscribe payload, every tile index dirty.
    /// Re-subscribing an existing region replaces its tiles and seeds but
    /// keeps the membership list, which still mirrors live entity positions.
    pub fn insert_region(&mut self, coord: RegionCoord, data: &TileData) {
        match self.regions.get_mut(&coord) {
            Some(existing) => {
                for cell in 0..REGION_TILES {
                    existing.set_tile(cell, data.tile(cell));
                    existing.set_seed(cell, data.seed(cell));
                }
                existing.mark_all_indices_dirty();
                existing.set_collider_dirty(true);
            }
            None => {
                self.regions.insert(coord, Region::new(coord, data));
            }
        }
        // a new edge changes the neighborhood of adjacent regions
        self.mark_border_neighbors_dirty(coord);
    }

    /// Drops a region, returning its entity membership for the caller to
    /// reconcile. `None` if the region was not subscribed.
    pub fn remove_region(&mut self, coord: RegionCoord) -> Option<Vec<EntityId>> {
        let mut region = self.regions.remove(&coord)?;
        let evicted = region.take_entities();
        self.mark_border_neighbors_dirty(coord);
        Some(evicted)
    }

    fn mark_border_neighbors_dirty(&mut self, coord: RegionCoord) {
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let neighbor = RegionCoord::new(coord.x + dx, coord.y + dy);
            if let Some(region) = self.regions.get_mut(&neighbor) {
                region.mark_all_indices_dirty();
            }
        }
    }

    pub fn is_subscribed(&self, coord: RegionCoord) -> bool {
        self.regions.contains_key(&coord)
    }

    pub fn subscribed(&self) -> impl Iterator<Item = RegionCoord> + '_ {
        self.regions.keys().copied()
    }

    pub fn region(&self, coord: RegionCoord) -> Option<&Region> {
        self.regions.get(&coord)
    }

    pub fn region_mut(&mut self, coord: RegionCoord) -> Option<&mut Region> {
        self.regions.get_mut(&coord)
    }

    /// The tile at exact world coordinates, `None` when out of bounds or the
    /// owning region is not subscribed.
    pub fn tile_at(&self, tile_x: i32, tile_y: i32) -> Option<TileType> {
        if tile_x < 0 || tile_y < 0 || tile_x >= self.width_tiles || tile_y >= self.height_tiles {
            return None;
        }
        let coord = RegionCoord::containing(tile_x, tile_y);
        let region = self.regions.get(&coord)?;
        Some(region.tile(coord.cell_of(tile_x, tile_y)))
    }

    /// Neighborhood lookup for autotiling: clamps to the world edge so border
    /// cells see their own edge repeated, and reports `None` only for
    /// unloaded regions.
    pub fn tile_normal(&self, tile_x: i32, tile_y: i32) -> Option<TileType> {
        let clamped_x = tile_x.clamp(0, self.width_tiles - 1);
        let clamped_y = tile_y.clamp(0, self.height_tiles - 1);
        self.tile_at(clamped_x, clamped_y)
    }

    /// Whether an entity can stand at a floating world position. Unloaded
    /// ground blocks.
    pub fn is_position_passable(&self, x: f32, y: f32) -> bool {
        self.tile_at(x.floor() as i32, y.floor() as i32)
            .map(TileType::is_passable)
            .unwrap_or(false)
    }

    /// Writes a tile and invalidates the 3x3 index neighborhood, crossing
    /// region boundaries where the cell sits on one. Returns false when the
    /// owning region is not subscribed (an expected race, skipped upstream).
    pub fn set_tile(&mut self, tile_x: i32, tile_y: i32, tile: TileType) -> bool {
        let coord = RegionCoord::containing(tile_x, tile_y);
        let Some(region) = self.regions.get_mut(&coord) else {
            return false;
        };
        region.set_tile(coord.cell_of(tile_x, tile_y), tile);
        region.set_collider_dirty(true);

        for (dx, dy) in [(0, 0)].into_iter().chain(NEIGHBOR_OFFSETS) {
            let neighbor_x = tile_x + dx;
            let neighbor_y = tile_y + dy;
            if neighbor_x < 0
                || neighbor_y < 0
                || neighbor_x >= self.width_tiles
                || neighbor_y >= self.height_tiles
            {
                continue;
            }
            let neighbor_coord = RegionCoord::containing(neighbor_x, neighbor_y);
            if let Some(neighbor_region) = self.regions.get_mut(&neighbor_coord) {
                neighbor_region.mark_index_dirty(neighbor_coord.cell_of(neighbor_x, neighbor_y));
            }
        }
        true
    }

    /// Adds an entity to the membership list of the region containing
    /// `(x, y)`. Returns the region, or `None` when it is not subscribed.
    pub fn add_entity(&mut self, id: EntityId, x: f32, y: f32) -> Option<RegionCoord> {
        let coord = RegionCoord::containing_position(x, y);
        let region = self.regions.get_mut(&coord)?;
        region.add_entity(id);
        Some(coord)
    }

    /// Removes an entity from the membership list of the region containing
    /// `(x, y)`.
    pub fn remove_entity(&mut self, id: EntityId, x: f32, y: f32) -> bool {
        let coord = RegionCoord::containing_position(x, y);
        self.regions
            .get_mut(&coord)
            .map(|region| region.remove_entity(id))
            .unwrap_or(false)
    }

    /// Recomputes every dirty tile index in a region. Cells whose paint has
    /// no registered sheet are reported and left dirty so the region retries
    /// next frame. Returns true when the whole region is clean.
    pub fn refresh_region_indices(
        &mut self,
        coord: RegionCoord,
        resolver: &AutotileResolver,
        sink: &mut dyn ErrorSink,
    ) -> bool {
        let Some(region) = self.regions.get(&coord) else {
            return false;
        };
        if !region.indices_dirty() {
            return true;
        }

        let (origin_x, origin_y) = coord.origin();
        let mut computed = Vec::new();
        for cell in 0..REGION_TILES {
            if region.index(cell) != INDEX_DIRTY {
                continue;
            }
            let tile_x = origin_x + cell as i32 % REGION_SIZE;
            let tile_y = origin_y + cell as i32 / REGION_SIZE;
            let mut neighbors = [None; 8];
            for (slot, (dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                neighbors[slot] = self.tile_normal(tile_x + dx, tile_y + dy);
            }
            let result = resolver.resolve(region.tile(cell), &neighbors, region.seed(cell));
            computed.push((cell, tile_x, tile_y, result));
        }

        let region = self
            .regions
            .get_mut(&coord)
            .expect("region vanished during refresh");
        let mut all_resolved = true;
        for (cell, tile_x, tile_y, result) in computed {
            match result {
                Ok(index) => region.set_index(cell, index.to_u16() as i32),
                Err(err) => {
                    all_resolved = false;
                    sink.report(
                        &err.to_string(),
                        &format!("region ({}, {}) tile ({tile_x}, {tile_y})", coord.x, coord.y),
                    );
                }
            }
        }
        region.set_indices_dirty(!all_resolved);
        all_resolved
    }

    /// The renderable index for a world tile, refreshing the region's cache
    /// if it is dirty. A `-1` slot in a region that claims to be clean is a
    /// caching bug: it is reported and recomputed rather than rendered.
    pub fn tile_index_at(
        &mut self,
        tile_x: i32,
        tile_y: i32,
        resolver: &AutotileResolver,
        sink: &mut dyn ErrorSink,
    ) -> Option<TileIndex> {
        let coord = RegionCoord::containing(tile_x, tile_y);
        if !self.regions.contains_key(&coord) {
            return None;
        }
        self.refresh_region_indices(coord, resolver, sink);

        let region = self.regions.get(&coord)?;
        let cell = coord.cell_of(tile_x, tile_y);
        let raw = region.index(cell);
        if raw == INDEX_DIRTY {
            if region.indices_dirty() {
                // known-unresolved cell, retried next frame
                return None;
            }
            sink.report(
                "tile index cache slot dirty in a clean region",
                &format!("tile ({tile_x}, {tile_y})"),
            );
            debug!("forcing recomputation of tile ({tile_x}, {tile_y})");
            self.regions
                .get_mut(&coord)
                .expect("region vanished during recompute")
                .mark_index_dirty(cell);
            self.refresh_region_indices(coord, resolver, sink);
            let region = self.regions.get(&coord)?;
            let raw = region.index(cell);
            if raw == INDEX_DIRTY {
                return None;
            }
            return Some(TileIndex::from_u16(raw as u16));
        }
        Some(TileIndex::from_u16(raw as u16))
    }
}
