//! Test fixtures for collection-router.
//!
//! Provides realistic test data including:
//! - Real Las Vegas / Henderson pickup sites (from OpenStreetMap)
//! - A pickup builder with sensible defaults

pub mod las_vegas_sites;

pub use las_vegas_sites::*;

use collection_router::model::WasteType;
use collection_router::{PickupLocation, Point};

/// Builder for test pickups.
#[derive(Clone, Debug)]
pub struct TestPickup {
    pickup: PickupLocation,
}

impl TestPickup {
    pub fn new(id: &str) -> Self {
        Self {
            pickup: PickupLocation::new(id, Point::new(0.0, 0.0)),
        }
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.pickup.point = Point::new(lat, lng);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.pickup.priority = priority;
        self
    }

    pub fn weight(mut self, kg: f64) -> Self {
        self.pickup.estimated_weight = kg;
        self
    }

    pub fn waste(mut self, waste_type: WasteType) -> Self {
        self.pickup.waste_type = waste_type;
        self
    }

    pub fn points(mut self, value: u32) -> Self {
        self.pickup.points_value = Some(value);
        self
    }

    pub fn build(self) -> PickupLocation {
        self.pickup
    }
}

/// Turns sites into pickups with ids `"{prefix}-{index}"`.
#[allow(dead_code)]
pub fn pickups_from(prefix: &str, sites: &[Site]) -> Vec<PickupLocation> {
    sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            TestPickup::new(&format!("{prefix}-{i}"))
                .at(site.lat, site.lng)
                .waste(site.waste)
                .weight(5.0 + i as f64)
                .build()
        })
        .collect()
}
