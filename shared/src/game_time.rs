//! Monotonic client time.
//!
//! All client-side timing flows through these two types rather than ambient
//! clocks: the embedding application samples its monotonic clock once per
//! frame and threads the resulting [`GameInstant`] through every call that
//! needs "now". This keeps the engine deterministic under test.

/// A point in monotonic client time, in milliseconds since client start.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameInstant(u64);

impl GameInstant {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn add(&self, duration: GameDuration) -> GameInstant {
        GameInstant(self.0.saturating_add(duration.as_millis() as u64))
    }

    /// Time elapsed since `earlier`. Saturates to zero if `earlier` is in the
    /// future (the clock is monotonic, but callers may hold stale instants).
    pub fn duration_since(&self, earlier: GameInstant) -> GameDuration {
        let millis = self.0.saturating_sub(earlier.0);
        GameDuration::from_millis(millis.min(u32::MAX as u64) as u32)
    }

    pub fn is_at_or_after(&self, other: GameInstant) -> bool {
        self.0 >= other.0
    }
}

/// A span of time, in milliseconds. Arithmetic saturates rather than wraps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameDuration(u32);

impl GameDuration {
    pub const ZERO: GameDuration = GameDuration(0);

    pub fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    pub fn from_secs(secs: u32) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub fn as_millis(&self) -> u32 {
        self.0
    }

    pub fn saturating_add(&self, other: GameDuration) -> GameDuration {
        GameDuration(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: GameDuration) -> GameDuration {
        GameDuration(self.0.saturating_sub(other.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_since_saturates_at_zero() {
        let earlier = GameInstant::from_millis(100);
        let later = GameInstant::from_millis(250);
        assert_eq!(later.duration_since(earlier), GameDuration::from_millis(150));
        assert_eq!(earlier.duration_since(later), GameDuration::ZERO);
    }

    #[test]
    fn add_then_compare() {
        let start = GameInstant::from_millis(1000);
        let due = start.add(GameDuration::from_millis(400));
        assert!(!start.is_at_or_after(due));
        assert!(due.is_at_or_after(due));
        assert!(due.add(GameDuration::from_millis(1)).is_at_or_after(due));
    }

    #[test]
    fn saturating_arithmetic() {
        let big = GameDuration::from_millis(u32::MAX);
        assert_eq!(big.saturating_add(GameDuration::from_millis(1)), big);
        assert_eq!(
            GameDuration::ZERO.saturating_sub(GameDuration::from_millis(1)),
            GameDuration::ZERO
        );
    }
}
