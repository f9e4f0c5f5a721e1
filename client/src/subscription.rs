//! Camera-driven region subscription.

use std::collections::HashSet;

use meadow_shared::{ClientRequest, RegionCoord, RequestSender, REGION_SIZE};

use crate::world::region_store::RegionStore;

/// The camera's view rectangle in world tile coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Extra tiles kept subscribed beyond the camera edge, so scrolling does
    /// not immediately churn subscriptions at the boundary.
    pub margin: f32,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self { margin: 8.0 }
    }
}

/// Computes, on camera movement, which regions should be subscribed and
/// emits exactly the delta as outbound requests. Push-driven, not polled:
/// the embedding application calls [`SubscriptionManager::update_camera`]
/// when the camera actually moves, and an unchanged camera produces no
/// further requests.
pub struct SubscriptionManager {
    config: SubscriptionConfig,
    /// Regions requested from the server, including ones whose payload has
    /// not arrived yet. Tracking requests rather than the store keeps the
    /// delta idempotent while responses are in flight.
    requested: HashSet<RegionCoord>,
}

impl SubscriptionManager {
    pub fn new(config: SubscriptionConfig) -> Self {
        Self {
            config,
            requested: HashSet::new(),
        }
    }

    pub fn requested(&self) -> &HashSet<RegionCoord> {
        &self.requested
    }

    /// Recomputes the desired region set for `camera` and sends the delta:
    /// one `SubscribeRegion` per new region and a single batched
    /// `UnsubscribeRegions` for every region that fell out of view.
    pub fn update_camera(
        &mut self,
        camera: CameraRect,
        store: &RegionStore,
        sender: &mut dyn RequestSender,
    ) {
        let desired = self.desired_regions(camera, store);

        let mut to_drop: Vec<RegionCoord> = self
            .requested
            .difference(&desired)
            .copied()
            .collect();
        to_drop.sort();

        let mut to_add: Vec<RegionCoord> = desired
            .difference(&self.requested)
            .copied()
            .collect();
        to_add.sort();

        if !to_drop.is_empty() {
            for coord in &to_drop {
                self.requested.remove(coord);
            }
            sender.send(ClientRequest::UnsubscribeRegions { coords: to_drop });
        }
        for coord in to_add {
            self.requested.insert(coord);
            sender.send(ClientRequest::SubscribeRegion { coord });
        }
    }

    fn desired_regions(&self, camera: CameraRect, store: &RegionStore) -> HashSet<RegionCoord> {
        let margin = self.config.margin;
        let min_tile_x = (camera.x - margin).floor() as i32;
        let min_tile_y = (camera.y - margin).floor() as i32;
        let max_tile_x = (camera.x + camera.width + margin).ceil() as i32 - 1;
        let max_tile_y = (camera.y + camera.height + margin).ceil() as i32 - 1;

        let (region_bound_x, region_bound_y) = store.region_bounds();
        let min_region_x = min_tile_x.div_euclid(REGION_SIZE).max(0);
        let min_region_y = min_tile_y.div_euclid(REGION_SIZE).max(0);
        let max_region_x = max_tile_x.div_euclid(REGION_SIZE).min(region_bound_x - 1);
        let max_region_y = max_tile_y.div_euclid(REGION_SIZE).min(region_bound_y - 1);

        let mut desired = HashSet::new();
        for region_y in min_region_y..=max_region_y {
            for region_x in min_region_x..=max_region_x {
                desired.insert(RegionCoord::new(region_x, region_y));
            }
        }
        desired
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new(SubscriptionConfig::default())
    }
}
