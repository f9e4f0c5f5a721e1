//! The shared inbound record stream: one discriminator byte per record,
//! add/update/remove entity and tile writes interleaved in server order.

use crate::entity_update::{EntityId, EntityUpdate};
use crate::serde::{ByteReader, ByteWriter, WireError, WireSerde};
use crate::tile::TileType;

const DISCRIMINATOR_NONE: u8 = 0;
const DISCRIMINATOR_ADD_ENTITY: u8 = 1;
const DISCRIMINATOR_UPDATE_ENTITY: u8 = 2;
const DISCRIMINATOR_REMOVE_ENTITY: u8 = 3;
const DISCRIMINATOR_UPDATE_TILE: u8 = 4;

/// One typed record of the update stream.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateRecord {
    AddEntity(EntityUpdate),
    UpdateEntity(EntityUpdate),
    RemoveEntity(EntityId),
    UpdateTile { x: u16, y: u16, tile: TileType },
}

impl WireSerde for UpdateRecord {
    fn ser(&self, writer: &mut ByteWriter) {
        match self {
            UpdateRecord::AddEntity(update) => {
                writer.write_u8(DISCRIMINATOR_ADD_ENTITY);
                update.ser(writer);
            }
            UpdateRecord::UpdateEntity(update) => {
                writer.write_u8(DISCRIMINATOR_UPDATE_ENTITY);
                update.ser(writer);
            }
            UpdateRecord::RemoveEntity(id) => {
                writer.write_u8(DISCRIMINATOR_REMOVE_ENTITY);
                id.ser(writer);
            }
            UpdateRecord::UpdateTile { x, y, tile } => {
                writer.write_u8(DISCRIMINATOR_UPDATE_TILE);
                writer.write_u16(*x);
                writer.write_u16(*y);
                tile.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        let discriminator = reader.read_u8()?;
        match discriminator {
            DISCRIMINATOR_ADD_ENTITY => Ok(UpdateRecord::AddEntity(EntityUpdate::de(reader)?)),
            DISCRIMINATOR_UPDATE_ENTITY => {
                Ok(UpdateRecord::UpdateEntity(EntityUpdate::de(reader)?))
            }
            DISCRIMINATOR_REMOVE_ENTITY => Ok(UpdateRecord::RemoveEntity(EntityId::de(reader)?)),
            DISCRIMINATOR_UPDATE_TILE => {
                let x = reader.read_u16()?;
                let y = reader.read_u16()?;
                let tile = TileType::de(reader)?;
                Ok(UpdateRecord::UpdateTile { x, y, tile })
            }
            value => Err(WireError::InvalidDiscriminator { value }),
        }
    }
}

/// Decodes records until the buffer is exhausted. `None` records
/// (discriminator 0) are skipped. A truncated or invalid record aborts the
/// whole call; no partial record is ever surfaced.
pub fn read_records(reader: &mut ByteReader) -> Result<Vec<UpdateRecord>, WireError> {
    let mut records = Vec::new();
    while !reader.is_empty() {
        if reader.peek_u8()? == DISCRIMINATOR_NONE {
            reader.read_u8()?;
            continue;
        }
        records.push(UpdateRecord::de(reader)?);
    }
    Ok(records)
}

/// Encodes a record stream, the inverse of [`read_records`].
pub fn write_records(records: &[UpdateRecord], writer: &mut ByteWriter) {
    for record in records {
        record.ser(writer);
    }
}
