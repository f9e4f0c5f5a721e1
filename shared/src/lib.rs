//! # Meadow Shared
//! Wire protocol, tile vocabulary & game-time primitives shared by the
//! meadow client and its transport.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod entity_update;
mod flags;
mod game_time;
mod region_payload;
mod request;
mod serde;
mod tile;
mod update_record;

pub use entity_update::{ActionCode, EntityId, EntityKind, EntityUpdate};
pub use flags::{MovementFlags, PlayerFlags, Pose, StateFlags};
pub use game_time::{GameDuration, GameInstant};
pub use region_payload::{
    RegionCoord, RegionPayload, TileData, WorldUpdate, REGION_SIZE, REGION_TILES,
};
pub use request::{
    from_move_fixed, to_move_fixed, ClientRequest, Direction, RequestSender,
    MOVE_FIXED_POINT_SCALE,
};
pub use serde::{ByteReader, ByteWriter, WireError, WireSerde};
pub use tile::{TileIndex, TilePaint, TileType, ANIMATION_FRAME_MS, TILE_PAINT_COUNT};
pub use update_record::{read_records, write_records, UpdateRecord};
