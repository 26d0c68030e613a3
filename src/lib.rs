//! collection-router core
//!
//! Orders waste pickups into a depot-anchored collection route and resolves
//! road geometry for each leg, with cost and emission metrics.

pub mod assembler;
pub mod cluster;
pub mod config;
pub mod dijkstra;
pub mod error;
pub mod graph;
pub mod haversine;
pub mod metrics;
pub mod model;
pub mod osrm;
pub mod osrm_data;
pub mod polyline;
pub mod solver;
pub mod traits;
pub mod tsp;

pub use config::{GraphConfig, OptimizeConfig};
pub use error::{Error, Result};
pub use model::{Leg, LegSource, OptimizeRequest, OptimizedRoute, PickupLocation, Point, RouteMetrics, VehicleType};
pub use solver::{Collaborators, optimize, route_point_to_point};
