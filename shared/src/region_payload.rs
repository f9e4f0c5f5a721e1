//! Region subscription payloads: the coordinate vocabulary, the packed
//! per-cell tile blob, and the batched inbound `WorldUpdate`.

use crate::entity_update::EntityUpdate;
use crate::serde::{ByteReader, ByteWriter, WireError, WireSerde};
use crate::tile::TileType;
use crate::update_record::UpdateRecord;

/// Side length of a region, in tiles.
pub const REGION_SIZE: i32 = 8;

/// Cells per region, row-major.
pub const REGION_TILES: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Integer coordinates of a region, the unit of subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub x: i32,
    pub y: i32,
}

impl RegionCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The region containing the given world tile.
    pub fn containing(tile_x: i32, tile_y: i32) -> Self {
        Self {
            x: tile_x.div_euclid(REGION_SIZE),
            y: tile_y.div_euclid(REGION_SIZE),
        }
    }

    /// The region containing a floating-point world position.
    pub fn containing_position(x: f32, y: f32) -> Self {
        Self::containing(x.floor() as i32, y.floor() as i32)
    }

    /// World tile coordinates of this region's top-left cell.
    pub fn origin(&self) -> (i32, i32) {
        (self.x * REGION_SIZE, self.y * REGION_SIZE)
    }

    /// Row-major cell index for a world tile inside this region.
    pub fn cell_of(&self, tile_x: i32, tile_y: i32) -> usize {
        let (origin_x, origin_y) = self.origin();
        let local_x = tile_x - origin_x;
        let local_y = tile_y - origin_y;
        debug_assert!((0..REGION_SIZE).contains(&local_x));
        debug_assert!((0..REGION_SIZE).contains(&local_y));
        (local_y * REGION_SIZE + local_x) as usize
    }
}

impl WireSerde for RegionCoord {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.x);
        writer.write_i32(self.y);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        let x = reader.read_i32()?;
        let y = reader.read_i32()?;
        Ok(Self { x, y })
    }
}

/// The packed per-cell blob delivered at subscribe time: tile type plus the
/// random seed used to pick among equivalent tile-art variants. The at-rest
/// layout is a u16 cell-count header followed by `(type, seed)` byte pairs in
/// row-major order; re-encoding a decoded blob is lossless.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileData {
    types: Vec<TileType>,
    seeds: Vec<u8>,
}

impl TileData {
    /// An empty region: every cell `None` with a zero seed.
    pub fn empty() -> Self {
        Self {
            types: vec![TileType::None; REGION_TILES],
            seeds: vec![0; REGION_TILES],
        }
    }

    pub fn from_cells(types: Vec<TileType>, seeds: Vec<u8>) -> Self {
        assert_eq!(types.len(), REGION_TILES);
        assert_eq!(seeds.len(), REGION_TILES);
        Self { types, seeds }
    }

    /// A uniform region with deterministic per-cell seeds, handy in tests.
    pub fn filled(tile: TileType) -> Self {
        Self {
            types: vec![tile; REGION_TILES],
            seeds: (0..REGION_TILES).map(|cell| cell as u8).collect(),
        }
    }

    pub fn tile(&self, cell: usize) -> TileType {
        self.types[cell]
    }

    pub fn seed(&self, cell: usize) -> u8 {
        self.seeds[cell]
    }

    pub fn set_tile(&mut self, cell: usize, tile: TileType) {
        self.types[cell] = tile;
    }

    pub fn tiles(&self) -> &[TileType] {
        &self.types
    }

    pub fn seeds(&self) -> &[u8] {
        &self.seeds
    }
}

impl WireSerde for TileData {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(REGION_TILES as u16);
        for cell in 0..REGION_TILES {
            writer.write_u8(self.types[cell] as u8);
            writer.write_u8(self.seeds[cell]);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        let count = reader.read_u16()? as usize;
        if count != REGION_TILES {
            return Err(WireError::BadCellCount {
                got: count,
                expected: REGION_TILES,
            });
        }
        let mut types = Vec::with_capacity(REGION_TILES);
        let mut seeds = Vec::with_capacity(REGION_TILES);
        for _ in 0..REGION_TILES {
            types.push(TileType::de(reader)?);
            seeds.push(reader.read_u8()?);
        }
        Ok(Self { types, seeds })
    }
}

/// The full snapshot delivered when a region is subscribed: coordinates, the
/// entities present at subscribe time, and the tile blob.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionPayload {
    pub coord: RegionCoord,
    pub entities: Vec<EntityUpdate>,
    pub tiles: TileData,
}

impl WireSerde for RegionPayload {
    fn ser(&self, writer: &mut ByteWriter) {
        self.coord.ser(writer);
        writer.write_u16(self.entities.len().min(u16::MAX as usize) as u16);
        for entity in &self.entities {
            entity.ser(writer);
        }
        self.tiles.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        let coord = RegionCoord::de(reader)?;
        let count = reader.read_u16()? as usize;
        let mut entities = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            entities.push(EntityUpdate::de(reader)?);
        }
        let tiles = TileData::de(reader)?;
        Ok(Self {
            coord,
            entities,
            tiles,
        })
    }
}

/// One inbound batch. The sections are wire-ordered the way the reconciler
/// must apply them: unsubscribes, then subscribes, then the record stream
/// (tile records before entity records within it).
#[derive(Clone, Debug, PartialEq)]
pub struct WorldUpdate {
    pub unsubscribes: Vec<RegionCoord>,
    pub subscribes: Vec<RegionPayload>,
    pub records: Vec<UpdateRecord>,
}

impl WorldUpdate {
    pub fn empty() -> Self {
        Self {
            unsubscribes: Vec::new(),
            subscribes: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl WireSerde for WorldUpdate {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(self.unsubscribes.len().min(u16::MAX as usize) as u16);
        for coord in &self.unsubscribes {
            coord.ser(writer);
        }
        writer.write_u16(self.subscribes.len().min(u16::MAX as usize) as u16);
        for payload in &self.subscribes {
            payload.ser(writer);
        }
        writer.write_u16(self.records.len().min(u16::MAX as usize) as u16);
        for record in &self.records {
            record.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        let unsubscribe_count = reader.read_u16()? as usize;
        let mut unsubscribes = Vec::with_capacity(unsubscribe_count.min(1024));
        for _ in 0..unsubscribe_count {
            unsubscribes.push(RegionCoord::de(reader)?);
        }
        let subscribe_count = reader.read_u16()? as usize;
        let mut subscribes = Vec::with_capacity(subscribe_count.min(1024));
        for _ in 0..subscribe_count {
            subscribes.push(RegionPayload::de(reader)?);
        }
        let record_count = reader.read_u16()? as usize;
        let mut records = Vec::with_capacity(record_count.min(1024));
        for _ in 0..record_count {
            records.push(UpdateRecord::de(reader)?);
        }
        Ok(Self {
            unsubscribes,
            subscribes,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_update::EntityId;

    #[test]
    fn containing_handles_negative_tiles() {
        assert_eq!(RegionCoord::containing(0, 0), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::containing(7, 7), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::containing(8, 0), RegionCoord::new(1, 0));
        assert_eq!(RegionCoord::containing(-1, -8), RegionCoord::new(-1, -1));
        assert_eq!(RegionCoord::containing(-9, 15), RegionCoord::new(-2, 1));
    }

    #[test]
    fn cell_of_is_row_major() {
        let coord = RegionCoord::new(2, 3);
        assert_eq!(coord.origin(), (16, 24));
        assert_eq!(coord.cell_of(16, 24), 0);
        assert_eq!(coord.cell_of(23, 24), 7);
        assert_eq!(coord.cell_of(16, 25), 8);
        assert_eq!(coord.cell_of(23, 31), 63);
    }

    #[test]
    fn tile_data_round_trips_losslessly() {
        let mut data = TileData::filled(TileType::Grass);
        data.set_tile(5, TileType::Water);
        data.set_tile(37, TileType::WalkableIce);

        let bytes = data.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        let decoded = TileData::de(&mut reader).unwrap();
        assert_eq!(decoded, data);

        // decode → re-encode → decode is also lossless
        let bytes_again = decoded.to_bytes();
        assert_eq!(bytes_again, bytes);
    }

    #[test]
    fn tile_data_rejects_wrong_cell_count() {
        let mut writer = ByteWriter::new();
        writer.write_u16(10);
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(
            TileData::de(&mut reader).unwrap_err(),
            WireError::BadCellCount {
                got: 10,
                expected: REGION_TILES
            }
        );
    }

    #[test]
    fn world_update_round_trips() {
        let mut entity = EntityUpdate::new(EntityId::new(9));
        entity.x = Some(17.0);
        entity.y = Some(25.0);
        let update = WorldUpdate {
            unsubscribes: vec![RegionCoord::new(-1, 2)],
            subscribes: vec![RegionPayload {
                coord: RegionCoord::new(2, 3),
                entities: vec![entity],
                tiles: TileData::filled(TileType::Stone),
            }],
            records: vec![UpdateRecord::RemoveEntity(EntityId::new(4))],
        };

        let bytes = update.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(WorldUpdate::de(&mut reader).unwrap(), update);
        assert!(reader.is_empty());
    }
}
