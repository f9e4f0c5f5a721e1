//! Server reconciliation: the batch dispatcher and its supporting state.

pub mod config;
pub mod event;
pub mod orphan;
pub mod party;
pub mod reconciler;
pub mod scheduler;
pub mod selection;

pub use config::SyncConfig;
pub use event::WorldEvent;
pub use orphan::OrphanChat;
pub use party::{AccountId, FriendList, FriendRecord, PartyList, PartyRecord};
pub use reconciler::SyncReconciler;
pub use scheduler::{DeferredAction, Scheduler, TaskHandle};
pub use selection::Selection;
