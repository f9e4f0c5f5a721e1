//! Bitfield vocabulary for entity state.

use crate::serde::{ByteReader, ByteWriter, WireError, WireSerde};

/// Discrete pose, stored in the low three bits of [`StateFlags`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Pose {
    Standing = 0,
    Trotting = 1,
    Sitting = 2,
    Lying = 3,
    Flying = 4,
}

impl Pose {
    pub fn from_bits(bits: u16) -> Option<Pose> {
        match bits {
            0 => Some(Pose::Standing),
            1 => Some(Pose::Trotting),
            2 => Some(Pose::Sitting),
            3 => Some(Pose::Lying),
            4 => Some(Pose::Flying),
            _ => None,
        }
    }
}

/// Generic per-entity state flags: bits 0-2 the pose, bit 3 facing right,
/// bit 4 head turned, bit 5 moving. Unassigned bits are preserved verbatim
/// so newer servers can carry flags older clients ignore.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StateFlags(u16);

impl StateFlags {
    const POSE_MASK: u16 = 0b0000_0111;
    pub const FACING_RIGHT: u16 = 1 << 3;
    pub const HEAD_TURNED: u16 = 1 << 4;
    pub const MOVING: u16 = 1 << 5;

    pub fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// The pose encoded in the low bits; out-of-range values read as
    /// `Standing` rather than failing, since flags arrive mid-frame and the
    /// render path cannot reject them.
    pub fn pose(&self) -> Pose {
        Pose::from_bits(self.0 & Self::POSE_MASK).unwrap_or(Pose::Standing)
    }

    /// Writes the pose, preserving every unrelated bit.
    pub fn set_pose(&mut self, pose: Pose) {
        self.0 = (self.0 & !Self::POSE_MASK) | pose as u16;
    }

    pub fn contains(&self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u16, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

impl WireSerde for StateFlags {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        Ok(StateFlags(reader.read_u16()?))
    }
}

/// Flags that only apply to player-character entities.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayerFlags(u16);

impl PlayerFlags {
    pub const HIDDEN: u16 = 1 << 0;
    pub const BAD_NAME: u16 = 1 << 1;
    pub const INCOGNITO: u16 = 1 << 2;

    pub fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn contains(&self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u16, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

impl WireSerde for PlayerFlags {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        Ok(PlayerFlags(reader.read_u16()?))
    }
}

/// Flags carried by the outbound `Move` request.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MovementFlags(u16);

impl MovementFlags {
    pub const RUNNING: u16 = 1 << 0;
    pub const FLYING: u16 = 1 << 1;

    pub fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }
}

impl WireSerde for MovementFlags {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, WireError> {
        Ok(MovementFlags(reader.read_u16()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pose_preserves_unrelated_bits() {
        let mut flags = StateFlags::new(StateFlags::FACING_RIGHT | StateFlags::MOVING);
        flags.set_pose(Pose::Flying);
        assert_eq!(flags.pose(), Pose::Flying);
        assert!(flags.contains(StateFlags::FACING_RIGHT));
        assert!(flags.contains(StateFlags::MOVING));

        flags.set_pose(Pose::Standing);
        assert_eq!(flags.pose(), Pose::Standing);
        assert!(flags.contains(StateFlags::MOVING));
    }

    #[test]
    fn out_of_range_pose_reads_as_standing() {
        let flags = StateFlags::new(0b0000_0111);
        assert_eq!(flags.pose(), Pose::Standing);
    }

    #[test]
    fn player_flag_toggles() {
        let mut flags = PlayerFlags::default();
        assert!(!flags.contains(PlayerFlags::HIDDEN));
        flags.set(PlayerFlags::HIDDEN, true);
        assert!(flags.contains(PlayerFlags::HIDDEN));
        flags.set(PlayerFlags::HIDDEN, false);
        assert!(!flags.contains(PlayerFlags::HIDDEN));
    }
}
