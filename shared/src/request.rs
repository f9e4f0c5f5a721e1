//! Outbound requests emitted by the client and consumed by the transport
//! collaborator. The transport itself is out of scope; the engine only needs
//! something that accepts a [`ClientRequest`].

use crate::entity_update::EntityId;
use crate::flags::MovementFlags;
use crate::region_payload::RegionCoord;
use crate::serde::{ByteReader, ByteWriter, WireError, WireSerde};
use crate::tile::TileType;

const DISCRIMINATOR_SUBSCRIBE_REGION: u8 = 1;
const DISCRIMINATOR_UNSUBSCRIBE_REGIONS: u8 = 2;
const DISCRIMINATOR_MOVE: u8 = 3;
const DISCRIMINATOR_CHANGE_TILE: u8 = 4;
const DISCRIMINATOR_SELECT_ENTITY: u8 = 5;

/// Fixed-point scale for the `Move` request's position delta: 1/256 tile.
pub const MOVE_FIXED_POINT_SCALE: f32 = 256.0;

/// Converts a tile-unit delta to the wire's 8.8 fixed-point encoding,
/// saturating at the i16 range.
pub fn to_move_fixed(delta: f32) -> i16 {
    (delta * MOVE_FIXED_POINT_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

pub fn from_move_fixed(fixed: i16) -> f32 {
    fixed as f32 / MOVE_FIXED_POINT_SCALE
}

/// Eight compass directions for the `Move` request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    pub fn from_u8(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(Direction::North),
            1 => Ok(Direction::NorthEast),
            2 => Ok(Direction::East),
            3 => Ok(Direction::SouthEast),
            4 => Ok(Direction::South),
            5 => Ok(Direction::SouthWest),
            6 => Ok(Direction::West),
            7 => Ok(Direction::NorthWest),
            value => Err(WireError::InvalidDirection { value }),
        }
    }
}

/// Everything the client ever sends upstream.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientRequest {
    SubscribeRegion {
        coord: RegionCoord,
    },
    UnsubscribeRegions {
        coords: Vec<RegionCoord>,
    },
    Move {
        /// Position delta in 8.8 fixed-point tile units.
        dx: i16,
        dy: i16,
        direction: Direction,
        flags: MovementFlags,
        /// Client monotonic milliseconds, for server-side latency tracking.
        timestamp: u32,
    },
    ChangeTile {
        x: u16,
        y: u16,
        tile: TileType,
    },
    SelectEntity {
        id: EntityId,
        fetch_flags: u8,
    },
}

impl WireSerde for ClientRequest {
    fn ser(&self, writer: &mut ByteWriter) {
        match self {
            ClientRequest::SubscribeRegion { coord } => {
                writer.write_u8(DISCRIMINATOR_SUBSCRIBE_REGION);
                coord.ser(writer);
            }
            ClientRequest::UnsubscribeRegions { coords } => {
                writer.write_u8(DISCRIMINATOR_UNSUBSCRIBE_REGIONS);
                writer.write_u16(coords.len().min(u16::MAX as usize) as u16);
                for coord in coords {
                    coord.ser(writer);
                }
            }
            ClientRequest::Move {
                dx,
                dy,
                direction,
                flags,
                timestamp,
            } => {
                writer.write_u8(DISCRIMINATOR_MOVE);
                writer.write_i16(*dx);
                writer.write_i16(*dy);
                writer.write_u8(*direction as u8);
                flags.ser(writer);
                writer.write_u32(*timestamp);
            }
            ClientRequest::ChangeTile { x, y, tile } => {
                writer.write_u8(DISCRIMINATOR_CHANGE_TILE);
                writer.write_u16(*x);
                writer.write_u16(*y);
                tile.ser(writer);
            }
            ClientRequest::SelectEntity { id, fetch_flags } => {
                writer.write_u8(DISCRIMINATOR_SELECT_ENTITY);
                id.ser(writer);
                writer.write_u8(*fetch_flags);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        let discriminator = reader.read_u8()?;
        match discriminator {
            DISCRIMINATOR_SUBSCRIBE_REGION => Ok(ClientRequest::SubscribeRegion {
                coord: RegionCoord::de(reader)?,
            }),
            DISCRIMINATOR_UNSUBSCRIBE_REGIONS => {
                let count = reader.read_u16()? as usize;
                let mut coords = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    coords.push(RegionCoord::de(reader)?);
                }
                Ok(ClientRequest::UnsubscribeRegions { coords })
            }
            DISCRIMINATOR_MOVE => {
                let dx = reader.read_i16()?;
                let dy = reader.read_i16()?;
                let direction = Direction::from_u8(reader.read_u8()?)?;
                let flags = MovementFlags::de(reader)?;
                let timestamp = reader.read_u32()?;
                Ok(ClientRequest::Move {
                    dx,
                    dy,
                    direction,
                    flags,
                    timestamp,
                })
            }
            DISCRIMINATOR_CHANGE_TILE => {
                let x = reader.read_u16()?;
                let y = reader.read_u16()?;
                let tile = TileType::de(reader)?;
                Ok(ClientRequest::ChangeTile { x, y, tile })
            }
            DISCRIMINATOR_SELECT_ENTITY => {
                let id = EntityId::de(reader)?;
                let fetch_flags = reader.read_u8()?;
                Ok(ClientRequest::SelectEntity { id, fetch_flags })
            }
            value => Err(WireError::InvalidDiscriminator { value }),
        }
    }
}

/// The transport collaborator interface: anything that can carry a request
/// upstream. Implementations serialize with [`WireSerde`] and own delivery.
pub trait RequestSender {
    fn send(&mut self, request: ClientRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(request: &ClientRequest) -> ClientRequest {
        let bytes = request.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        let decoded = ClientRequest::de(&mut reader).unwrap();
        assert!(reader.is_empty());
        decoded
    }

    #[test]
    fn every_request_round_trips() {
        let requests = vec![
            ClientRequest::SubscribeRegion {
                coord: RegionCoord::new(-3, 12),
            },
            ClientRequest::UnsubscribeRegions {
                coords: vec![RegionCoord::new(0, 0), RegionCoord::new(4, -4)],
            },
            ClientRequest::Move {
                dx: to_move_fixed(0.5),
                dy: to_move_fixed(-1.25),
                direction: Direction::SouthWest,
                flags: MovementFlags::new(MovementFlags::RUNNING),
                timestamp: 123_456,
            },
            ClientRequest::ChangeTile {
                x: 40,
                y: 17,
                tile: TileType::Wood,
            },
            ClientRequest::SelectEntity {
                id: EntityId::new(88),
                fetch_flags: 0b11,
            },
        ];
        for request in &requests {
            assert_eq!(&round_trip(request), request);
        }
    }

    #[test]
    fn fixed_point_is_exact_for_quarter_tiles() {
        assert_eq!(from_move_fixed(to_move_fixed(0.25)), 0.25);
        assert_eq!(from_move_fixed(to_move_fixed(-2.5)), -2.5);
        assert_eq!(to_move_fixed(1000.0), i16::MAX);
    }

    #[test]
    fn rejects_invalid_direction() {
        let request = ClientRequest::Move {
            dx: 0,
            dy: 0,
            direction: Direction::North,
            flags: MovementFlags::default(),
            timestamp: 0,
        };
        let mut bytes = request.to_bytes();
        bytes[5] = 200;
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(
            ClientRequest::de(&mut reader).unwrap_err(),
            WireError::InvalidDirection { value: 200 }
        );
    }
}
