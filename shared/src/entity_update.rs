//! The `AddEntity`/`UpdateEntity` payload: a server-assigned id followed by a
//! presence bitmap and the optional fields the bitmap declares, in a fixed
//! order. Absent fields are skipped on the wire, never zero-filled.

use crate::flags::{PlayerFlags, StateFlags};
use crate::serde::{ByteReader, ByteWriter, WireError, WireSerde};

/// Server-assigned entity id, unique while the entity is alive. Ids may be
/// reused after a removal plus sufficient delay, so identity must never be
/// inferred from the id alone across a remove boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl WireSerde for EntityId {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        Ok(EntityId(reader.read_u32()?))
    }
}

/// Closed set of entity kinds. `Pony` is the appearance-bearing
/// player-character kind; everything else is a simple prop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntityKind {
    Pony = 0,
    Tree = 1,
    Rock = 2,
    Flower = 3,
    Lantern = 4,
    Bench = 5,
    Sign = 6,
}

impl EntityKind {
    pub fn from_u8(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(EntityKind::Pony),
            1 => Ok(EntityKind::Tree),
            2 => Ok(EntityKind::Rock),
            3 => Ok(EntityKind::Flower),
            4 => Ok(EntityKind::Lantern),
            5 => Ok(EntityKind::Bench),
            6 => Ok(EntityKind::Sign),
            value => Err(WireError::InvalidEntityKind { value }),
        }
    }

    pub fn is_character(self) -> bool {
        matches!(self, EntityKind::Pony)
    }
}

/// Fire-and-forget cosmetic action codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionCode {
    Boop = 0,
    Sneeze = 1,
    Laugh = 2,
    Yawn = 3,
    Salute = 4,
    Wave = 5,
    Blush = 6,
}

impl ActionCode {
    pub fn from_u8(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(ActionCode::Boop),
            1 => Ok(ActionCode::Sneeze),
            2 => Ok(ActionCode::Laugh),
            3 => Ok(ActionCode::Yawn),
            4 => Ok(ActionCode::Salute),
            5 => Ok(ActionCode::Wave),
            6 => Ok(ActionCode::Blush),
            value => Err(WireError::InvalidActionCode { value }),
        }
    }
}

// Presence bitmap bits, in wire field order.
const PRESENT_KIND: u16 = 1 << 0;
const PRESENT_X: u16 = 1 << 1;
const PRESENT_Y: u16 = 1 << 2;
const PRESENT_VX: u16 = 1 << 3;
const PRESENT_VY: u16 = 1 << 4;
const PRESENT_STATE: u16 = 1 << 5;
const PRESENT_PLAYER_STATE: u16 = 1 << 6;
const PRESENT_APPEARANCE: u16 = 1 << 7;
const PRESENT_NAME: u16 = 1 << 8;
const PRESENT_CRC: u16 = 1 << 9;
const PRESENT_ACTION: u16 = 1 << 10;
// Behavioral flag, carries no payload bytes.
const FLAG_SWITCH_REGION: u16 = 1 << 11;

/// One entity add/update as it travels on the wire. Every field past the id
/// is independently optional; `switch_region` asks the receiver to perform an
/// atomic cross-region transfer along with the position write.
///
/// Positions are in floating tile units; the appearance blob is opaque to the
/// sync engine and handed through to the character system.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityUpdate {
    pub id: EntityId,
    pub kind: Option<EntityKind>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub vx: Option<f32>,
    pub vy: Option<f32>,
    pub state: Option<StateFlags>,
    pub player_state: Option<PlayerFlags>,
    pub appearance: Option<Vec<u8>>,
    pub name: Option<String>,
    pub crc: Option<u32>,
    pub action: Option<ActionCode>,
    pub switch_region: bool,
}

impl EntityUpdate {
    /// An update with every optional field absent.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            kind: None,
            x: None,
            y: None,
            vx: None,
            vy: None,
            state: None,
            player_state: None,
            appearance: None,
            name: None,
            crc: None,
            action: None,
            switch_region: false,
        }
    }

    fn presence(&self) -> u16 {
        let mut bits = 0;
        if self.kind.is_some() {
            bits |= PRESENT_KIND;
        }
        if self.x.is_some() {
            bits |= PRESENT_X;
        }
        if self.y.is_some() {
            bits |= PRESENT_Y;
        }
        if self.vx.is_some() {
            bits |= PRESENT_VX;
        }
        if self.vy.is_some() {
            bits |= PRESENT_VY;
        }
        if self.state.is_some() {
            bits |= PRESENT_STATE;
        }
        if self.player_state.is_some() {
            bits |= PRESENT_PLAYER_STATE;
        }
        if self.appearance.is_some() {
            bits |= PRESENT_APPEARANCE;
        }
        if self.name.is_some() {
            bits |= PRESENT_NAME;
        }
        if self.crc.is_some() {
            bits |= PRESENT_CRC;
        }
        if self.action.is_some() {
            bits |= PRESENT_ACTION;
        }
        if self.switch_region {
            bits |= FLAG_SWITCH_REGION;
        }
        bits
    }
}

impl WireSerde for EntityUpdate {
    fn ser(&self, writer: &mut ByteWriter) {
        self.id.ser(writer);
        writer.write_u16(self.presence());
        if let Some(kind) = self.kind {
            writer.write_u8(kind as u8);
        }
        if let Some(x) = self.x {
            writer.write_f32(x);
        }
        if let Some(y) = self.y {
            writer.write_f32(y);
        }
        if let Some(vx) = self.vx {
            writer.write_f32(vx);
        }
        if let Some(vy) = self.vy {
            writer.write_f32(vy);
        }
        if let Some(state) = self.state {
            state.ser(writer);
        }
        if let Some(player_state) = self.player_state {
            player_state.ser(writer);
        }
        if let Some(appearance) = &self.appearance {
            writer.write_bytes(appearance);
        }
        if let Some(name) = &self.name {
            writer.write_string(name);
        }
        if let Some(crc) = self.crc {
            writer.write_u32(crc);
        }
        if let Some(action) = self.action {
            writer.write_u8(action as u8);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        let id = EntityId::de(reader)?;
        let bits = reader.read_u16()?;
        let mut update = EntityUpdate::new(id);
        if bits & PRESENT_KIND != 0 {
            update.kind = Some(EntityKind::from_u8(reader.read_u8()?)?);
        }
        if bits & PRESENT_X != 0 {
            update.x = Some(reader.read_f32()?);
        }
        if bits & PRESENT_Y != 0 {
            update.y = Some(reader.read_f32()?);
        }
        if bits & PRESENT_VX != 0 {
            update.vx = Some(reader.read_f32()?);
        }
        if bits & PRESENT_VY != 0 {
            update.vy = Some(reader.read_f32()?);
        }
        if bits & PRESENT_STATE != 0 {
            update.state = Some(StateFlags::de(reader)?);
        }
        if bits & PRESENT_PLAYER_STATE != 0 {
            update.player_state = Some(PlayerFlags::de(reader)?);
        }
        if bits & PRESENT_APPEARANCE != 0 {
            update.appearance = Some(reader.read_bytes()?);
        }
        if bits & PRESENT_NAME != 0 {
            update.name = Some(reader.read_string()?);
        }
        if bits & PRESENT_CRC != 0 {
            update.crc = Some(reader.read_u32()?);
        }
        if bits & PRESENT_ACTION != 0 {
            update.action = Some(ActionCode::from_u8(reader.read_u8()?)?);
        }
        update.switch_region = bits & FLAG_SWITCH_REGION != 0;
        Ok(update)
    }
}
