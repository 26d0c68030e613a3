//! Request and result types for route optimization.
//!
//! All values are built per request and dropped once the result is returned.

use serde::{Deserialize, Serialize};

use crate::config::OptimizeConfig;
use crate::error::{Error, Result};
use crate::polyline::Polyline;

/// Identifier used for the depot in legs and stop sequences.
pub const DEPOT_ID: &str = "depot";

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Point {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects non-finite and out-of-range coordinates.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(Error::invalid_input(format!(
                "coordinate ({}, {}) is not finite",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::invalid_input(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::invalid_input(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }

    /// `[lng, lat]` order used by routing providers.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<(f64, f64)> for Point {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteType {
    Plastic,
    Paper,
    Glass,
    Metal,
    Organic,
    Electronic,
    #[default]
    #[serde(other)]
    Mixed,
}

/// A location awaiting collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupLocation {
    pub id: String,
    #[serde(flatten)]
    pub point: Point,
    #[serde(default)]
    pub waste_type: WasteType,
    /// Lower is more urgent.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub estimated_weight: f64,
    #[serde(default)]
    pub points_value: Option<u32>,
}

impl PickupLocation {
    pub fn new(id: impl Into<String>, point: Point) -> Self {
        Self {
            id: id.into(),
            point,
            waste_type: WasteType::default(),
            priority: 0,
            estimated_weight: 0.0,
            points_value: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_waste_type(mut self, waste_type: WasteType) -> Self {
        self.waste_type = waste_type;
        self
    }

    pub fn with_weight(mut self, kg: f64) -> Self {
        self.estimated_weight = kg;
        self
    }

    pub fn with_points_value(mut self, points: u32) -> Self {
        self.points_value = Some(points);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Truck,
    Van,
    Bike,
}

/// Input to [`crate::solver::optimize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub depot: Point,
    pub pickups: Vec<PickupLocation>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub config: Option<OptimizeConfig>,
}

impl OptimizeRequest {
    pub fn new(depot: Point, pickups: Vec<PickupLocation>, vehicle_type: VehicleType) -> Self {
        Self {
            depot,
            pickups,
            vehicle_type,
            config: None,
        }
    }

    pub fn with_config(mut self, config: OptimizeConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Where a leg's geometry came from, in decreasing order of fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegSource {
    Provider,
    InternalGraph,
    StraightLine,
}

/// One origin to destination segment of an assembled route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub from_id: String,
    pub to_id: String,
    pub polyline: Polyline,
    pub distance_km: f64,
    pub source: LegSource,
}

/// Percentage reductions against the unoptimized baseline, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Savings {
    pub distance: f64,
    pub time: f64,
    pub cost: f64,
    pub emissions: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetrics {
    pub total_distance_km: f64,
    pub total_time_minutes: f64,
    pub fuel_cost: f64,
    pub co2_kg: f64,
    /// Comparative score only, higher is shorter.
    pub efficiency_score: f64,
    pub savings: Savings,
}

/// Output of [`crate::solver::optimize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    /// Pickup ids in visiting order; the depot is implied first.
    pub ordered_stops: Vec<String>,
    pub legs: Vec<Leg>,
    pub metrics: RouteMetrics,
    /// Pickup ids per cluster, in visiting order.
    pub clusters: Vec<Vec<String>>,
    pub two_opt_swaps: usize,
    pub total_weight_kg: f64,
    pub total_points_value: u64,
}

impl OptimizedRoute {
    /// Number of legs that had to fall back to a straight line.
    pub fn straight_line_legs(&self) -> usize {
        self.legs
            .iter()
            .filter(|leg| leg.source == LegSource::StraightLine)
            .count()
    }
}
