//! One fixed-size partition of the world grid.

use meadow_shared::{EntityId, RegionCoord, TileData, TileType, REGION_TILES};

/// Sentinel for a tile-index cache slot that has not been computed yet.
pub const INDEX_DIRTY: i32 = -1;

/// A subscribed region: the tile-type grid, the lazily computed tile-index
/// cache, the per-cell variant seeds fixed at creation, the mutable elevation
/// layer, and the ids of the entities currently positioned inside it.
///
/// Membership is ids only; the [`crate::EntityTable`] owns the entities.
pub struct Region {
    coord: RegionCoord,
    tiles: [TileType; REGION_TILES],
    indices: [i32; REGION_TILES],
    seeds: [u8; REGION_TILES],
    elevation: [u8; REGION_TILES],
    indices_dirty: bool,
    collider_dirty: bool,
    entities: Vec<EntityId>,
}

impl Region {
    /// A fresh region from a subscribe payload. Every tile index starts
    /// dirty; nothing is computed until the first read.
    pub fn new(coord: RegionCoord, data: &TileData) -> Self {
        let mut tiles = [TileType::None; REGION_TILES];
        let mut seeds = [0u8; REGION_TILES];
        for cell in 0..REGION_TILES {
            tiles[cell] = data.tile(cell);
            seeds[cell] = data.seed(cell);
        }
        Self {
            coord,
            tiles,
            indices: [INDEX_DIRTY; REGION_TILES],
            seeds,
            elevation: [0; REGION_TILES],
            indices_dirty: true,
            collider_dirty: true,
            entities: Vec::new(),
        }
    }

    pub fn coord(&self) -> RegionCoord {
        self.coord
    }

    pub fn tile(&self, cell: usize) -> TileType {
        self.tiles[cell]
    }

    pub fn set_tile(&mut self, cell: usize, tile: TileType) {
        self.tiles[cell] = tile;
    }

    pub fn seed(&self, cell: usize) -> u8 {
        self.seeds[cell]
    }

    pub fn set_seed(&mut self, cell: usize, seed: u8) {
        self.seeds[cell] = seed;
    }

    pub fn index(&self, cell: usize) -> i32 {
        self.indices[cell]
    }

    pub fn set_index(&mut self, cell: usize, index: i32) {
        self.indices[cell] = index;
    }

    pub fn mark_index_dirty(&mut self, cell: usize) {
        self.indices[cell] = INDEX_DIRTY;
        self.indices_dirty = true;
    }

    pub fn mark_all_indices_dirty(&mut self) {
        self.indices = [INDEX_DIRTY; REGION_TILES];
        self.indices_dirty = true;
    }

    pub fn indices_dirty(&self) -> bool {
        self.indices_dirty
    }

    pub fn set_indices_dirty(&mut self, dirty: bool) {
        self.indices_dirty = dirty;
    }

    pub fn collider_dirty(&self) -> bool {
        self.collider_dirty
    }

    pub fn set_collider_dirty(&mut self, dirty: bool) {
        self.collider_dirty = dirty;
    }

    pub fn elevation(&self, cell: usize) -> u8 {
        self.elevation[cell]
    }

    pub fn set_elevation(&mut self, cell: usize, elevation: u8) {
        self.elevation[cell] = elevation;
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn add_entity(&mut self, id: EntityId) {
        if !self.entities.contains(&id) {
            self.entities.push(id);
        }
    }

    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if let Some(position) = self.entities.iter().position(|&member| member == id) {
            self.entities.swap_remove(position);
            true
        } else {
            false
        }
    }

    /// Drains the membership list, for region teardown.
    pub fn take_entities(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.entities)
    }

    /// The region's tiles and seeds as an at-rest blob; re-encoding a decoded
    /// region is lossless.
    pub fn to_tile_data(&self) -> TileData {
        TileData::from_cells(self.tiles.to_vec(), self.seeds.to_vec())
    }
}
