//! Optimization settings and per-vehicle cost profiles.
//!
//! Everything is passed explicitly with the request; missing fields take the
//! defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::VehicleType;

/// Finest lattice spacing accepted from a request.
pub const MIN_LATTICE_SPACING_KM: f64 = 1e-3;
/// A 2x2 grid is the coarsest lattice that still spans a region.
pub const MIN_LATTICE_NODES: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizeConfig {
    /// Upper bound on pickups per cluster.
    pub max_cluster_size: usize,
    /// Overrides the vehicle profile's consumption.
    pub fuel_consumption_l_per_km: Option<f64>,
    pub fuel_price_per_l: f64,
    /// Overrides the vehicle profile's emission factor.
    pub emission_factor_kg_per_km: Option<f64>,
    /// Maximum number of full 2-opt passes per cluster.
    pub two_opt_iteration_cap: usize,
    pub routing_provider_timeout_ms: u64,
    /// Close the route with a leg back to the depot.
    pub return_to_depot: bool,
    pub graph: GraphConfig,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: 5,
            fuel_consumption_l_per_km: None,
            fuel_price_per_l: 1.50,
            emission_factor_kg_per_km: None,
            two_opt_iteration_cap: 100,
            routing_provider_timeout_ms: 8_000,
            return_to_depot: false,
            graph: GraphConfig::default(),
        }
    }
}

impl OptimizeConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.routing_provider_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStrategy {
    #[default]
    Lattice,
    CrowdSourced,
    /// No internal graph; legs go straight to the provider or a straight line.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    pub strategy: GraphStrategy,
    pub lattice_spacing_km: f64,
    pub connectivity: Connectivity,
    /// The lattice spacing grows until the grid fits under this many nodes.
    pub max_lattice_nodes: usize,
    pub proximity_threshold_km: f64,
    /// Most recent historical records requested for the crowd-sourced graph.
    pub history_limit: usize,
    /// Query points farther than this from every node are not snapped.
    pub snap_radius_km: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            strategy: GraphStrategy::default(),
            lattice_spacing_km: 0.25,
            connectivity: Connectivity::default(),
            max_lattice_nodes: 40_000,
            proximity_threshold_km: 0.2,
            history_limit: 1_000,
            snap_radius_km: 1.0,
        }
    }
}

impl GraphConfig {
    /// Rejects values that cannot produce a usable graph.
    pub fn validate(&self) -> Result<()> {
        if !self.lattice_spacing_km.is_finite() || self.lattice_spacing_km < MIN_LATTICE_SPACING_KM {
            return Err(Error::invalid_input(format!(
                "lattice spacing must be at least {MIN_LATTICE_SPACING_KM} km, got {}",
                self.lattice_spacing_km
            )));
        }
        if self.max_lattice_nodes < MIN_LATTICE_NODES {
            return Err(Error::invalid_input(format!(
                "max lattice nodes must be at least {MIN_LATTICE_NODES}, got {}",
                self.max_lattice_nodes
            )));
        }
        positive("proximity threshold", self.proximity_threshold_km)?;
        positive("snap radius", self.snap_radius_km)
    }
}

fn positive(what: &str, km: f64) -> Result<()> {
    if km.is_finite() && km > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("{what} must be a positive distance, got {km}")))
    }
}

/// Physical characteristics used for time, fuel and emission estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleProfile {
    pub average_speed_kmh: f64,
    pub fuel_consumption_l_per_km: f64,
    pub emission_factor_kg_per_km: f64,
    /// Profile name understood by the routing provider.
    pub provider_profile: &'static str,
}

impl VehicleType {
    pub fn profile(&self) -> VehicleProfile {
        match self {
            VehicleType::Truck => VehicleProfile {
                average_speed_kmh: 40.0,
                fuel_consumption_l_per_km: 0.35,
                emission_factor_kg_per_km: 0.94,
                provider_profile: "car",
            },
            VehicleType::Van => VehicleProfile {
                average_speed_kmh: 50.0,
                fuel_consumption_l_per_km: 0.12,
                emission_factor_kg_per_km: 0.32,
                provider_profile: "car",
            },
            VehicleType::Bike => VehicleProfile {
                average_speed_kmh: 15.0,
                fuel_consumption_l_per_km: 0.0,
                emission_factor_kg_per_km: 0.0,
                provider_profile: "bike",
            },
        }
    }
}

/// Vehicle profile with any request overrides applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub average_speed_kmh: f64,
    pub fuel_consumption_l_per_km: f64,
    pub fuel_price_per_l: f64,
    pub emission_factor_kg_per_km: f64,
}

impl CostModel {
    pub fn new(vehicle: VehicleType, config: &OptimizeConfig) -> Self {
        let profile = vehicle.profile();
        Self {
            average_speed_kmh: profile.average_speed_kmh,
            fuel_consumption_l_per_km: config
                .fuel_consumption_l_per_km
                .unwrap_or(profile.fuel_consumption_l_per_km),
            fuel_price_per_l: config.fuel_price_per_l,
            emission_factor_kg_per_km: config
                .emission_factor_kg_per_km
                .unwrap_or(profile.emission_factor_kg_per_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: OptimizeConfig =
            serde_json::from_str(r#"{"maxClusterSize": 3, "graph": {"strategy": "disabled"}}"#)
                .unwrap();
        assert_eq!(config.max_cluster_size, 3);
        assert_eq!(config.two_opt_iteration_cap, 100);
        assert_eq!(config.routing_provider_timeout_ms, 8_000);
        assert_eq!(config.graph.strategy, GraphStrategy::Disabled);
        assert_eq!(config.graph.proximity_threshold_km, 0.2);
    }

    #[test]
    fn test_cost_model_overrides() {
        let config = OptimizeConfig {
            fuel_consumption_l_per_km: Some(0.5),
            ..OptimizeConfig::default()
        };
        let cost = CostModel::new(VehicleType::Truck, &config);
        assert_eq!(cost.fuel_consumption_l_per_km, 0.5);
        assert_eq!(cost.emission_factor_kg_per_km, 0.94);
        assert_eq!(cost.average_speed_kmh, 40.0);
    }

    #[test]
    fn test_bike_profile() {
        let profile = VehicleType::Bike.profile();
        assert_eq!(profile.average_speed_kmh, 15.0);
        assert_eq!(profile.provider_profile, "bike");
    }

    #[test]
    fn test_default_graph_config_is_valid() {
        assert!(GraphConfig::default().validate().is_ok());
    }

    #[test]
    fn test_graph_config_rejects_unusable_values() {
        let cases = [
            GraphConfig { lattice_spacing_km: 1e-30, ..GraphConfig::default() },
            GraphConfig { lattice_spacing_km: 0.0, ..GraphConfig::default() },
            GraphConfig { lattice_spacing_km: f64::INFINITY, ..GraphConfig::default() },
            GraphConfig { lattice_spacing_km: f64::NAN, ..GraphConfig::default() },
            GraphConfig { max_lattice_nodes: 3, ..GraphConfig::default() },
            GraphConfig { max_lattice_nodes: 0, ..GraphConfig::default() },
            GraphConfig { proximity_threshold_km: 0.0, ..GraphConfig::default() },
            GraphConfig { proximity_threshold_km: f64::NAN, ..GraphConfig::default() },
            GraphConfig { snap_radius_km: -1.0, ..GraphConfig::default() },
            GraphConfig { snap_radius_km: f64::INFINITY, ..GraphConfig::default() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(Error::InvalidInput(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn test_graph_config_accepts_boundaries() {
        let config = GraphConfig {
            lattice_spacing_km: MIN_LATTICE_SPACING_KM,
            max_lattice_nodes: MIN_LATTICE_NODES,
            ..GraphConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_timeout() {
        let config = OptimizeConfig::default();
        assert_eq!(config.provider_timeout(), Duration::from_secs(8));
    }
}
