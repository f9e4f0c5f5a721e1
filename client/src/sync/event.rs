//! Events the reconciler surfaces to the embedding application, drained once
//! per frame after every inbound batch has been applied.

use meadow_shared::{ActionCode, EntityId};

/// One reconciliation side effect the renderer or UI should react to.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    EntityAdded(EntityId),
    EntityRemoved(EntityId),
    /// Play the one-shot disappearance effect at the given position.
    DespawnEffect { id: EntityId, x: f32, y: f32 },
    /// Play the one-shot transform effect; the appearance swap follows after
    /// a short scheduled delay so the two appear synchronized.
    TransformEffect { id: EntityId },
    /// A fire-and-forget cosmetic action.
    Action { id: EntityId, code: ActionCode },
    /// A chat line ready to display, possibly released from the orphan
    /// buffer after its entity appeared.
    Chat { id: EntityId, text: String },
    SelectionChanged(Option<EntityId>),
}
