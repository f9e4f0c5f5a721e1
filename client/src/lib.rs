//! # Meadow Client
//! Client-side world state for the meadow protocol: the region store, the
//! entity table, the terrain autotiler, and the reconciler that keeps them
//! consistent with the authoritative server.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod interfaces;
mod subscription;
mod sync;
mod world;

pub use interfaces::{CollectingErrorSink, ErrorSink, LogErrorSink, MaskNameFilter, NameFilter};
pub use subscription::{CameraRect, SubscriptionConfig, SubscriptionManager};
pub use sync::{
    AccountId, DeferredAction, FriendList, FriendRecord, OrphanChat, PartyList, PartyRecord,
    Scheduler, Selection, SyncConfig, SyncReconciler, TaskHandle, WorldEvent,
};
pub use world::{
    AutotileError, AutotileResolver, Bounds, Entity, EntityPayload, EntityTable, Region,
    RegionStore, TileSheets, INDEX_DIRTY,
};
pub use world::autotile::{
    canonical_mask, neighbor_mask, BLOB_SHAPE_COUNT, DIRT_SHAPE, INTERIOR_SHAPE, ISOLATED_SHAPE,
    NEIGHBOR_OFFSETS,
};
