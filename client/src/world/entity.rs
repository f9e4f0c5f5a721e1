//! The canonical client-side entity record.

use meadow_shared::{EntityId, EntityKind, PlayerFlags, StateFlags};

/// Kind-specific payload. Characters carry the opaque appearance blob the
/// character system renders from; props carry nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityPayload {
    Character { appearance: Vec<u8> },
    Prop,
}

/// Axis-aligned bounds in world tile units, exposed for the external
/// camera-visibility test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One live entity. Owned exclusively by [`crate::EntityTable`]; regions and
/// the selection refer to it by id only.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub state: StateFlags,
    pub player_state: PlayerFlags,
    pub name: Option<String>,
    pub crc: Option<u32>,
    pub payload: EntityPayload,
    /// Cleared on the local player so it cannot interact with itself.
    pub interactive: bool,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, x: f32, y: f32) -> Self {
        let payload = if kind.is_character() {
            EntityPayload::Character {
                appearance: Vec::new(),
            }
        } else {
            EntityPayload::Prop
        };
        Self {
            id,
            kind,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            state: StateFlags::default(),
            player_state: PlayerFlags::default(),
            name: None,
            crc: None,
            payload,
            interactive: true,
        }
    }

    pub fn is_character(&self) -> bool {
        self.kind.is_character()
    }

    pub fn is_hidden(&self) -> bool {
        self.player_state.contains(PlayerFlags::HIDDEN)
    }

    /// Draw/selection bounds; characters are taller than the props they
    /// stand next to.
    pub fn bounds(&self) -> Bounds {
        let (width, height) = match self.kind {
            EntityKind::Pony => (1.0, 2.0),
            EntityKind::Tree => (2.0, 3.0),
            EntityKind::Rock | EntityKind::Flower | EntityKind::Sign => (1.0, 1.0),
            EntityKind::Lantern => (1.0, 2.0),
            EntityKind::Bench => (2.0, 1.0),
        };
        Bounds {
            x: self.x - width / 2.0,
            y: self.y - height,
            width,
            height,
        }
    }

    /// Stores a new appearance blob. Only meaningful for characters; props
    /// ignore it.
    pub fn set_appearance(&mut self, blob: Vec<u8>) {
        if let EntityPayload::Character { appearance } = &mut self.payload {
            *appearance = blob;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_payload_holds_the_appearance() {
        let mut entity = Entity::new(EntityId::new(1), EntityKind::Pony, 0.0, 0.0);
        entity.set_appearance(vec![1, 2, 3]);
        assert_eq!(
            entity.payload,
            EntityPayload::Character {
                appearance: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn props_ignore_appearance_writes() {
        let mut entity = Entity::new(EntityId::new(2), EntityKind::Rock, 0.0, 0.0);
        entity.set_appearance(vec![9]);
        assert_eq!(entity.payload, EntityPayload::Prop);
    }

    #[test]
    fn bounds_are_anchored_at_the_feet() {
        let entity = Entity::new(EntityId::new(3), EntityKind::Pony, 10.0, 5.0);
        let bounds = entity.bounds();
        assert_eq!(bounds.x, 9.5);
        assert_eq!(bounds.y, 3.0);
        assert_eq!(bounds.width, 1.0);
        assert_eq!(bounds.height, 2.0);
    }
}
