//! Tile vocabulary: the wire-level tile type, the rendering paint category,
//! and the derived tile index.

use crate::game_time::GameDuration;
use crate::serde::{ByteReader, ByteWriter, WireError, WireSerde};

/// The 8-bit tile type stored per grid cell, exactly as it travels on the
/// wire. Walkable variants render identically to their base type but pass
/// collision; `ElevatedDirt` renders as `Dirt` on a raised elevation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TileType {
    None = 0,
    Dirt = 1,
    Grass = 2,
    Water = 3,
    WalkableWater = 4,
    Ice = 5,
    WalkableIce = 6,
    SnowOnIce = 7,
    ElevatedDirt = 8,
    Stone = 9,
    Stone2 = 10,
    Boat = 11,
    Wood = 12,
    WallH = 13,
    WallV = 14,
}

impl TileType {
    pub fn from_u8(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(TileType::None),
            1 => Ok(TileType::Dirt),
            2 => Ok(TileType::Grass),
            3 => Ok(TileType::Water),
            4 => Ok(TileType::WalkableWater),
            5 => Ok(TileType::Ice),
            6 => Ok(TileType::WalkableIce),
            7 => Ok(TileType::SnowOnIce),
            8 => Ok(TileType::ElevatedDirt),
            9 => Ok(TileType::Stone),
            10 => Ok(TileType::Stone2),
            11 => Ok(TileType::Boat),
            12 => Ok(TileType::Wood),
            13 => Ok(TileType::WallH),
            14 => Ok(TileType::WallV),
            value => Err(WireError::InvalidTileType { value }),
        }
    }

    /// Collapses rendering-equivalent variants before autotiling: walkable
    /// water/ice become their solid counterpart, elevated dirt becomes dirt.
    pub fn normalized(self) -> TileType {
        match self {
            TileType::WalkableWater => TileType::Water,
            TileType::WalkableIce => TileType::Ice,
            TileType::ElevatedDirt => TileType::Dirt,
            other => other,
        }
    }

    /// Whether an entity can stand on this tile.
    pub fn is_passable(self) -> bool {
        !matches!(
            self,
            TileType::None
                | TileType::Water
                | TileType::Ice
                | TileType::WallH
                | TileType::WallV
        )
    }

    /// The palette/sprite-set category this tile draws from. Dirt patches
    /// live on the grass sheet; walls render through a separate sprite path
    /// and carry no paint.
    pub fn paint(self) -> TilePaint {
        match self.normalized() {
            TileType::None | TileType::WallH | TileType::WallV => TilePaint::None,
            TileType::Dirt | TileType::Grass => TilePaint::Grass,
            TileType::Water => TilePaint::Water,
            TileType::Wood => TilePaint::Wood,
            TileType::Ice => TilePaint::Ice,
            TileType::SnowOnIce => TilePaint::SnowOnIce,
            TileType::Stone => TilePaint::Stone,
            TileType::Stone2 => TilePaint::Stone2,
            TileType::Boat => TilePaint::Boat,
            // normalized() never returns a walkable/elevated variant
            TileType::WalkableWater | TileType::WalkableIce | TileType::ElevatedDirt => {
                TilePaint::None
            }
        }
    }
}

impl WireSerde for TileType {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u8(*self as u8);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        TileType::from_u8(reader.read_u8()?)
    }
}

/// Milliseconds per animation frame for time-animated paints.
pub const ANIMATION_FRAME_MS: u32 = 250;

/// Palette/sprite-set category, the high byte of a [`TileIndex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TilePaint {
    None = 0,
    Grass = 1,
    Water = 2,
    Wood = 3,
    Ice = 4,
    SnowOnIce = 5,
    Stone = 6,
    Stone2 = 7,
    Boat = 8,
}

/// Number of paint categories, for sheet-registry sizing.
pub const TILE_PAINT_COUNT: usize = 9;

impl TilePaint {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TilePaint::None),
            1 => Some(TilePaint::Grass),
            2 => Some(TilePaint::Water),
            3 => Some(TilePaint::Wood),
            4 => Some(TilePaint::Ice),
            5 => Some(TilePaint::SnowOnIce),
            6 => Some(TilePaint::Stone),
            7 => Some(TilePaint::Stone2),
            8 => Some(TilePaint::Boat),
            _ => None,
        }
    }

    /// The ordered frame cycle for time-animated paints. Water and boat decks
    /// ping-pong through three frames; ice shimmers between two. Everything
    /// else is static.
    pub fn animation_frames(self) -> &'static [u8] {
        match self {
            TilePaint::Water | TilePaint::Boat => &[0, 1, 2, 1],
            TilePaint::Ice => &[0, 1],
            _ => &[0],
        }
    }

    /// The sheet frame to draw at `elapsed` game time. Animation is driven by
    /// a shared elapsed-time counter and is independent of the autotile shape,
    /// so recomputing a tile index never changes its animation phase.
    pub fn animation_frame(self, elapsed: GameDuration) -> u8 {
        let frames = self.animation_frames();
        let step = (elapsed.as_millis() / ANIMATION_FRAME_MS) as usize;
        frames[step % frames.len()]
    }
}

/// A renderable tile variant: high byte paint category, low byte sprite
/// offset within that category's sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileIndex(u16);

impl TileIndex {
    pub fn new(paint: TilePaint, offset: u8) -> Self {
        Self(((paint as u16) << 8) | offset as u16)
    }

    pub fn paint(&self) -> TilePaint {
        // the high byte only ever comes from a TilePaint
        TilePaint::from_u8((self.0 >> 8) as u8).unwrap_or(TilePaint::None)
    }

    pub fn offset(&self) -> u8 {
        self.0 as u8
    }

    pub fn to_u16(&self) -> u16 {
        self.0
    }

    pub fn from_u16(value: u16) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_walkable_variants() {
        assert_eq!(TileType::WalkableWater.normalized(), TileType::Water);
        assert_eq!(TileType::WalkableIce.normalized(), TileType::Ice);
        assert_eq!(TileType::ElevatedDirt.normalized(), TileType::Dirt);
        assert_eq!(TileType::Grass.normalized(), TileType::Grass);
    }

    #[test]
    fn walkable_variants_pass_collision() {
        assert!(!TileType::Water.is_passable());
        assert!(TileType::WalkableWater.is_passable());
        assert!(!TileType::Ice.is_passable());
        assert!(TileType::WalkableIce.is_passable());
        assert!(!TileType::WallH.is_passable());
        assert!(TileType::Grass.is_passable());
        assert!(TileType::SnowOnIce.is_passable());
    }

    #[test]
    fn dirt_paints_with_the_grass_sheet() {
        assert_eq!(TileType::Dirt.paint(), TilePaint::Grass);
        assert_eq!(TileType::ElevatedDirt.paint(), TilePaint::Grass);
        assert_eq!(TileType::WallH.paint(), TilePaint::None);
    }

    #[test]
    fn rejects_unknown_tile_byte() {
        assert_eq!(
            TileType::from_u8(200),
            Err(WireError::InvalidTileType { value: 200 })
        );
    }

    #[test]
    fn tile_index_packs_paint_and_offset() {
        let index = TileIndex::new(TilePaint::Water, 17);
        assert_eq!(index.paint(), TilePaint::Water);
        assert_eq!(index.offset(), 17);
        assert_eq!(TileIndex::from_u16(index.to_u16()), index);
    }

    #[test]
    fn water_animation_cycles_and_grass_does_not() {
        let at = |ms| TilePaint::Water.animation_frame(GameDuration::from_millis(ms));
        assert_eq!(at(0), 0);
        assert_eq!(at(ANIMATION_FRAME_MS), 1);
        assert_eq!(at(ANIMATION_FRAME_MS * 2), 2);
        assert_eq!(at(ANIMATION_FRAME_MS * 3), 1);
        assert_eq!(at(ANIMATION_FRAME_MS * 4), 0);
        assert_eq!(
            TilePaint::Grass.animation_frame(GameDuration::from_millis(10_000)),
            0
        );
    }
}
