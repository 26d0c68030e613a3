//! Distance, time, cost and emission figures for an assembled route.

use crate::config::CostModel;
use crate::haversine;
use crate::model::{Leg, PickupLocation, Point, RouteMetrics, Savings};

/// Numerator of the inverse-distance efficiency score.
const EFFICIENCY_SCALE: f64 = 1000.0;

/// Distance-derived quantities for one route.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Totals {
    distance_km: f64,
    time_minutes: f64,
    fuel_cost: f64,
    co2_kg: f64,
}

impl Totals {
    fn from_distance(distance_km: f64, cost: &CostModel) -> Self {
        let time_minutes = if cost.average_speed_kmh > 0.0 {
            distance_km / cost.average_speed_kmh * 60.0
        } else {
            0.0
        };
        Self {
            distance_km,
            time_minutes,
            fuel_cost: distance_km * cost.fuel_consumption_l_per_km * cost.fuel_price_per_l,
            co2_kg: distance_km * cost.emission_factor_kg_per_km,
        }
    }
}

/// Length of the unoptimized route: depot, then pickups in input order,
/// joined by straight lines.
pub fn baseline_distance_km(depot: Point, pickups: &[PickupLocation], return_to_depot: bool) -> f64 {
    let mut points: Vec<Point> = Vec::with_capacity(pickups.len() + 2);
    points.push(depot);
    points.extend(pickups.iter().map(|pickup| pickup.point));
    if return_to_depot && !pickups.is_empty() {
        points.push(depot);
    }
    haversine::path_length_km(&points)
}

/// Computes route metrics from resolved legs against a baseline distance.
pub fn calculate(legs: &[Leg], baseline_km: f64, cost: &CostModel) -> RouteMetrics {
    let distance_km: f64 = legs.iter().map(|leg| leg.polyline.length_km()).sum();
    let optimized = Totals::from_distance(distance_km, cost);
    let baseline = Totals::from_distance(baseline_km, cost);

    RouteMetrics {
        total_distance_km: optimized.distance_km,
        total_time_minutes: optimized.time_minutes,
        fuel_cost: optimized.fuel_cost,
        co2_kg: optimized.co2_kg,
        efficiency_score: efficiency_score(distance_km),
        savings: Savings {
            distance: percent_reduction(baseline.distance_km, optimized.distance_km),
            time: percent_reduction(baseline.time_minutes, optimized.time_minutes),
            cost: percent_reduction(baseline.fuel_cost, optimized.fuel_cost),
            emissions: percent_reduction(baseline.co2_kg, optimized.co2_kg),
        },
    }
}

/// `1000 / distance`, rounded; zero for an empty route.
pub fn efficiency_score(distance_km: f64) -> f64 {
    if distance_km > 0.0 {
        (EFFICIENCY_SCALE / distance_km).round()
    } else {
        0.0
    }
}

/// Percentage by which `optimized` undercuts `baseline`, clamped at zero.
pub fn percent_reduction(baseline: f64, optimized: f64) -> f64 {
    if baseline > 0.0 {
        ((baseline - optimized) / baseline * 100.0).max(0.0)
    } else {
        0.0
    }
}
