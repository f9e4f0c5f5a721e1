//! Reconciliation tuning knobs.
//!
//! These are policy parameters, not protocol constants: the server never
//! states how much client-predicted drift it tolerates, so the threshold (and
//! the cosmetic delays that must stay in step with effect animations) are
//! configured per deployment rather than hard-wired.

use meadow_shared::GameDuration;

#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Player position drift, in tiles, at or beyond which the local
    /// prediction is snapped to the server value.
    pub drift_threshold: f32,
    /// Delay between the transform effect starting and the appearance swap,
    /// so the swap lands mid-effect.
    pub appearance_swap_delay: GameDuration,
    /// How long a removed selection stays soft-alive to tolerate
    /// resubscription flicker.
    pub selection_grace: GameDuration,
    /// How long a chat line waits for its entity before being dropped.
    pub orphan_expiry: GameDuration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            drift_threshold: 1.0,
            appearance_swap_delay: GameDuration::from_millis(400),
            selection_grace: GameDuration::from_millis(1_000),
            orphan_expiry: GameDuration::from_secs(5),
        }
    }
}
