//! Interfaces to the router's external collaborators.
//!
//! These are intentionally minimal. Concrete apps implement them for their
//! own routing backends and pickup history stores.

use std::time::Duration;

use crate::error::Result;
use crate::model::Point;
use crate::polyline::Polyline;

/// A single origin-destination query sent to a road-routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// `[lng, lat]` pairs, origin first.
    pub coordinates: [[f64; 2]; 2],
    /// Provider-specific vehicle profile, e.g. "car" or "bike".
    pub vehicle_profile: String,
    /// Hard upper bound on the call; exceeding it counts as a failure.
    pub timeout: Duration,
}

impl ProviderRequest {
    pub fn new(from: Point, to: Point, vehicle_profile: impl Into<String>, timeout: Duration) -> Self {
        Self {
            coordinates: [from.lng_lat(), to.lng_lat()],
            vehicle_profile: vehicle_profile.into(),
            timeout,
        }
    }
}

/// Road geometry returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub distance_km: f64,
    pub duration_hours: f64,
    pub polyline: Polyline,
}

/// External road-routing service (OSRM or similar).
///
/// Any error is treated as provider unavailability and triggers the
/// fallback chain; it is never surfaced to the optimizer's caller.
pub trait RoutingProvider: Send + Sync {
    fn route(&self, request: &ProviderRequest) -> Result<ProviderRoute>;
}

/// Source of historical pickup coordinates for the crowd-sourced graph.
pub trait HistoryProvider {
    /// Up to `limit` most recent pickup coordinates, newest first.
    fn recent_pickups(&self, limit: usize) -> Result<Vec<Point>>;
}
