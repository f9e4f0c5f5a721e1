//! Terrain autotiling: turns a tile's 8-neighborhood into a renderable
//! sprite variant.
//!
//! Each of the eight directions contributes one bit to a neighbor-match mask.
//! The mask reduces to one of 47 canonical blob-tileset shapes (a corner only
//! counts when both adjacent edges match, which merges the mirrored/rotated
//! duplicates), and the shape picks a base sprite offset. Shapes with more
//! than one piece of art use the cell's fixed random seed to choose a
//! variant, so the same cell always resolves to the same sprite and
//! recomputation never makes terrain "pop".

use thiserror::Error;

use meadow_shared::{TileIndex, TilePaint, TileType, TILE_PAINT_COUNT};

// Neighbor bits, in the fixed direction order NW, N, NE, W, E, SW, S, SE.
pub const DIR_NW: u8 = 1 << 0;
pub const DIR_N: u8 = 1 << 1;
pub const DIR_NE: u8 = 1 << 2;
pub const DIR_W: u8 = 1 << 3;
pub const DIR_E: u8 = 1 << 4;
pub const DIR_SW: u8 = 1 << 5;
pub const DIR_S: u8 = 1 << 6;
pub const DIR_SE: u8 = 1 << 7;

/// The (dx, dy) offsets matching the mask bit order.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Number of canonical blob shapes.
pub const BLOB_SHAPE_COUNT: usize = 47;

/// A cell with no matching neighbors: the isolated island shape.
pub const ISOLATED_SHAPE: u8 = 0;

/// A cell whose whole neighborhood matches: the fully interior shape.
pub const INTERIOR_SHAPE: u8 = 46;

/// Dirt bypasses the table entirely and always renders all-interior.
pub const DIRT_SHAPE: u8 = 47;

const SHAPE_COUNT: usize = BLOB_SHAPE_COUNT + 1; // 47 blob shapes + the dirt bypass

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutotileError {
    /// The cell's paint category has no registered sprite set. The caller
    /// must leave the cell uncached and the region dirty so it retries.
    #[error("no tile sheet registered for paint {paint:?}")]
    UnregisteredSheet { paint: TilePaint },
}

/// Which paint categories have sprite sets loaded. Sheets normally all exist;
/// a missing one means the asset pipeline and the tile vocabulary disagree,
/// which the resolver reports instead of caching a bogus index.
#[derive(Clone, Debug)]
pub struct TileSheets {
    registered: [bool; TILE_PAINT_COUNT],
}

impl TileSheets {
    /// Every paint registered.
    pub fn standard() -> Self {
        Self {
            registered: [true; TILE_PAINT_COUNT],
        }
    }

    /// No paints registered; register them one by one.
    pub fn empty() -> Self {
        Self {
            registered: [false; TILE_PAINT_COUNT],
        }
    }

    pub fn register(&mut self, paint: TilePaint) {
        self.registered[paint as usize] = true;
    }

    pub fn unregister(&mut self, paint: TilePaint) {
        self.registered[paint as usize] = false;
    }

    pub fn is_registered(&self, paint: TilePaint) -> bool {
        self.registered[paint as usize]
    }
}

/// Builds the 8-bit neighbor-match mask for a cell. A bit is set when that
/// neighbor's normalized type equals the center's normalized type; unloaded
/// neighbors (`None`) never match.
pub fn neighbor_mask(center: TileType, neighbors: &[Option<TileType>; 8]) -> u8 {
    let center = center.normalized();
    let mut mask = 0;
    for (bit, neighbor) in neighbors.iter().enumerate() {
        if let Some(neighbor) = neighbor {
            if neighbor.normalized() == center {
                mask |= 1 << bit;
            }
        }
    }
    mask
}

/// Reduces a raw mask to its canonical blob form: a corner bit survives only
/// when both adjacent edge bits are set. Exactly 47 canonical masks exist.
pub fn canonical_mask(mask: u8) -> u8 {
    let mut out = mask & (DIR_N | DIR_W | DIR_E | DIR_S);
    let n = mask & DIR_N != 0;
    let w = mask & DIR_W != 0;
    let e = mask & DIR_E != 0;
    let s = mask & DIR_S != 0;
    if n && w {
        out |= mask & DIR_NW;
    }
    if n && e {
        out |= mask & DIR_NE;
    }
    if s && w {
        out |= mask & DIR_SW;
    }
    if s && e {
        out |= mask & DIR_SE;
    }
    out
}

// Canonical masks whose shapes have extra art. The straight-edge shapes (one
// open side against a large same-type area) carry 3 variants; the fully
// interior shape carries 4; everything else has a single sprite.
const OPEN_NORTH: u8 = DIR_W | DIR_E | DIR_SW | DIR_S | DIR_SE;
const OPEN_SOUTH: u8 = DIR_NW | DIR_N | DIR_NE | DIR_W | DIR_E;
const OPEN_WEST: u8 = DIR_N | DIR_NE | DIR_E | DIR_S | DIR_SE;
const OPEN_EAST: u8 = DIR_NW | DIR_N | DIR_W | DIR_SW | DIR_S;

fn variants_for(canonical: u8) -> u8 {
    match canonical {
        0xff => 4,
        OPEN_NORTH | OPEN_SOUTH | OPEN_WEST | OPEN_EAST => 3,
        _ => 1,
    }
}

/// Pure, deterministic mapping from (tile grid, neighborhood, seed) to a
/// renderable [`TileIndex`]. Construct once and share; the lookup tables are
/// built at construction.
pub struct AutotileResolver {
    shape_for_mask: [u8; 256],
    base_offsets: [u8; SHAPE_COUNT],
    variant_counts: [u8; SHAPE_COUNT],
    sheets: TileSheets,
}

impl AutotileResolver {
    pub fn new(sheets: TileSheets) -> Self {
        // Canonical masks sorted ascending; a mask's shape id is its rank.
        // Rank 0 is mask 0x00 (isolated) and rank 46 is 0xff (interior).
        let mut canonical: Vec<u8> = (0u16..=255).map(|m| canonical_mask(m as u8)).collect();
        canonical.sort_unstable();
        canonical.dedup();
        debug_assert_eq!(canonical.len(), BLOB_SHAPE_COUNT);

        let mut shape_for_mask = [0u8; 256];
        for mask in 0..=255u8 {
            let rank = canonical
                .binary_search(&canonical_mask(mask))
                .expect("canonical mask missing from its own table");
            shape_for_mask[mask as usize] = rank as u8;
        }

        let mut variant_counts = [1u8; SHAPE_COUNT];
        for (shape, &mask) in canonical.iter().enumerate() {
            variant_counts[shape] = variants_for(mask);
        }
        variant_counts[DIRT_SHAPE as usize] = 1;

        let mut base_offsets = [0u8; SHAPE_COUNT];
        let mut offset = 0u8;
        for shape in 0..SHAPE_COUNT {
            base_offsets[shape] = offset;
            offset += variant_counts[shape];
        }

        Self {
            shape_for_mask,
            base_offsets,
            variant_counts,
            sheets,
        }
    }

    pub fn sheets(&self) -> &TileSheets {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut TileSheets {
        &mut self.sheets
    }

    /// The canonical shape id for a raw neighbor mask.
    pub fn shape_for_mask(&self, mask: u8) -> u8 {
        self.shape_for_mask[mask as usize]
    }

    /// Resolves one cell. `neighbors` is in [`NEIGHBOR_OFFSETS`] order, with
    /// `None` for neighbors in unloaded regions.
    pub fn resolve(
        &self,
        center: TileType,
        neighbors: &[Option<TileType>; 8],
        seed: u8,
    ) -> Result<TileIndex, AutotileError> {
        let paint = center.paint();
        if paint == TilePaint::None {
            // walls and empty cells render through a separate sprite path
            return Ok(TileIndex::new(TilePaint::None, 0));
        }
        if !self.sheets.is_registered(paint) {
            return Err(AutotileError::UnregisteredSheet { paint });
        }

        let shape = if center.normalized() == TileType::Dirt {
            DIRT_SHAPE
        } else {
            self.shape_for_mask[neighbor_mask(center, neighbors) as usize]
        };

        let variants = self.variant_counts[shape as usize];
        let variant = if variants > 1 { seed % variants } else { 0 };
        let offset = self.base_offsets[shape as usize] + variant;
        Ok(TileIndex::new(paint, offset))
    }
}

impl Default for AutotileResolver {
    fn default() -> Self {
        Self::new(TileSheets::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(tile: TileType) -> [Option<TileType>; 8] {
        [Some(tile); 8]
    }

    #[test]
    fn exactly_47_canonical_shapes() {
        let mut canonical: Vec<u8> = (0u16..=255).map(|m| canonical_mask(m as u8)).collect();
        canonical.sort_unstable();
        canonical.dedup();
        assert_eq!(canonical.len(), BLOB_SHAPE_COUNT);
    }

    #[test]
    fn mask_extremes_map_to_documented_shapes() {
        let resolver = AutotileResolver::default();
        assert_eq!(resolver.shape_for_mask(0b0000_0000), ISOLATED_SHAPE);
        assert_eq!(resolver.shape_for_mask(0b1111_1111), INTERIOR_SHAPE);
    }

    #[test]
    fn corner_without_adjacent_edges_is_ignored() {
        let resolver = AutotileResolver::default();
        // a lone NW corner reduces to the isolated shape
        assert_eq!(resolver.shape_for_mask(DIR_NW), ISOLATED_SHAPE);
        // NW corner with both edges is a distinct shape
        assert_ne!(
            resolver.shape_for_mask(DIR_NW | DIR_N | DIR_W),
            resolver.shape_for_mask(DIR_N | DIR_W)
        );
    }

    #[test]
    fn isolated_island_resolves_to_shape_zero() {
        let resolver = AutotileResolver::default();
        let index = resolver
            .resolve(TileType::Grass, &all(TileType::Water), 3)
            .unwrap();
        assert_eq!(index.paint(), TilePaint::Grass);
        assert_eq!(index.offset(), 0); // isolated shape has a single variant at offset 0
    }

    #[test]
    fn interior_cell_uses_seed_to_pick_among_four_variants() {
        let resolver = AutotileResolver::default();
        let mut offsets = Vec::new();
        for seed in 0..8 {
            let index = resolver
                .resolve(TileType::Grass, &all(TileType::Grass), seed)
                .unwrap();
            offsets.push(index.offset());
        }
        // deterministic per seed
        for seed in 0..8u8 {
            let again = resolver
                .resolve(TileType::Grass, &all(TileType::Grass), seed)
                .unwrap();
            assert_eq!(again.offset(), offsets[seed as usize]);
        }
        // four distinct variants cycle with the seed
        let distinct: std::collections::HashSet<u8> = offsets.iter().copied().collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn walkable_water_matches_water_neighbors() {
        let resolver = AutotileResolver::default();
        let as_walkable = resolver
            .resolve(TileType::WalkableWater, &all(TileType::Water), 0)
            .unwrap();
        let as_plain = resolver
            .resolve(TileType::Water, &all(TileType::WalkableWater), 0)
            .unwrap();
        assert_eq!(as_walkable, as_plain);
        assert_eq!(as_walkable.paint(), TilePaint::Water);
    }

    #[test]
    fn dirt_bypasses_the_table() {
        let resolver = AutotileResolver::default();
        let surrounded = resolver
            .resolve(TileType::Dirt, &all(TileType::Dirt), 0)
            .unwrap();
        let isolated = resolver
            .resolve(TileType::Dirt, &all(TileType::Water), 0)
            .unwrap();
        assert_eq!(surrounded, isolated);
        assert_eq!(surrounded.paint(), TilePaint::Grass);
        // elevated dirt normalizes to dirt and takes the same bypass
        let elevated = resolver
            .resolve(TileType::ElevatedDirt, &all(TileType::Water), 0)
            .unwrap();
        assert_eq!(elevated, surrounded);
    }

    #[test]
    fn unregistered_sheet_is_reported_not_cached() {
        let mut sheets = TileSheets::standard();
        sheets.unregister(TilePaint::SnowOnIce);
        let resolver = AutotileResolver::new(sheets);
        assert_eq!(
            resolver.resolve(TileType::SnowOnIce, &all(TileType::SnowOnIce), 0),
            Err(AutotileError::UnregisteredSheet {
                paint: TilePaint::SnowOnIce
            })
        );
        // other paints still resolve
        assert!(resolver
            .resolve(TileType::Grass, &all(TileType::Grass), 0)
            .is_ok());
    }

    #[test]
    fn walls_resolve_through_the_separate_path() {
        let resolver = AutotileResolver::default();
        let index = resolver
            .resolve(TileType::WallH, &all(TileType::WallH), 0)
            .unwrap();
        assert_eq!(index.paint(), TilePaint::None);
        assert_eq!(index.offset(), 0);
    }

    #[test]
    fn open_side_shapes_have_three_variants() {
        let resolver = AutotileResolver::default();
        // everything matches except the north side: a top edge of a large area
        let neighbors: [Option<TileType>; 8] = [
            Some(TileType::Water), // NW
            Some(TileType::Water), // N
            Some(TileType::Water), // NE
            Some(TileType::Grass), // W
            Some(TileType::Grass), // E
            Some(TileType::Grass), // SW
            Some(TileType::Grass), // S
            Some(TileType::Grass), // SE
        ];
        let offsets: std::collections::HashSet<u8> = (0..9)
            .map(|seed| {
                resolver
                    .resolve(TileType::Grass, &neighbors, seed)
                    .unwrap()
                    .offset()
            })
            .collect();
        assert_eq!(offsets.len(), 3);
    }
}
