//! Leg geometry resolution and route stitching.
//!
//! Each leg is resolved by trying an ordered list of strategies; the first
//! success wins. A straight line is the terminal fallback, so assembly
//! itself cannot fail.

use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::dijkstra;
use crate::error::{Error, Result};
use crate::graph::RoadGraph;
use crate::model::{Leg, LegSource, Point};
use crate::polyline::Polyline;
use crate::traits::{ProviderRequest, RoutingProvider};

/// A stop in visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub point: Point,
}

impl Stop {
    pub fn new(id: impl Into<String>, point: Point) -> Self {
        Self {
            id: id.into(),
            point,
        }
    }
}

/// One way of producing a leg's geometry.
pub trait LegStrategy: Send + Sync {
    fn source(&self) -> LegSource;

    /// Geometry from `from` to `to`, or why this strategy could not produce it.
    fn resolve(&self, from: Point, to: Point) -> Result<Polyline>;
}

/// Delegates to an external road-routing provider.
pub struct ProviderLegs<'a> {
    provider: &'a dyn RoutingProvider,
    vehicle_profile: &'static str,
    timeout: Duration,
}

impl<'a> ProviderLegs<'a> {
    pub fn new(provider: &'a dyn RoutingProvider, vehicle_profile: &'static str, timeout: Duration) -> Self {
        Self {
            provider,
            vehicle_profile,
            timeout,
        }
    }
}

impl LegStrategy for ProviderLegs<'_> {
    fn source(&self) -> LegSource {
        LegSource::Provider
    }

    fn resolve(&self, from: Point, to: Point) -> Result<Polyline> {
        let request = ProviderRequest::new(from, to, self.vehicle_profile, self.timeout);
        let route = self.provider.route(&request)?;
        if route.polyline.len() < 2 {
            return Err(Error::provider_unavailable("provider geometry has fewer than two points"));
        }
        debug!(
            provider_km = route.distance_km,
            provider_hours = route.duration_hours,
            "provider resolved leg"
        );
        Ok(route.polyline)
    }
}

/// Dijkstra over the internal road graph.
pub struct GraphLegs<'a> {
    graph: &'a RoadGraph,
    snap_radius_km: f64,
}

impl<'a> GraphLegs<'a> {
    pub fn new(graph: &'a RoadGraph, snap_radius_km: f64) -> Self {
        Self {
            graph,
            snap_radius_km,
        }
    }
}

impl LegStrategy for GraphLegs<'_> {
    fn source(&self) -> LegSource {
        LegSource::InternalGraph
    }

    fn resolve(&self, from: Point, to: Point) -> Result<Polyline> {
        dijkstra::route_between(self.graph, from, to, self.snap_radius_km).map(|path| path.polyline)
    }
}

/// Joins stops into legs using strategies in priority order.
#[derive(Default)]
pub struct RouteAssembler<'a> {
    strategies: Vec<Box<dyn LegStrategy + 'a>>,
}

impl<'a> RouteAssembler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a strategy after the ones already registered.
    pub fn with_strategy(mut self, strategy: impl LegStrategy + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Resolves every consecutive pair of `stops` into a leg.
    ///
    /// Legs are resolved in parallel; the output keeps stop order.
    pub fn assemble(&self, stops: &[Stop]) -> Vec<Leg> {
        stops
            .par_windows(2)
            .map(|pair| self.resolve_leg(&pair[0], &pair[1]))
            .collect()
    }

    /// Resolves a single leg, falling back to a straight line.
    pub fn resolve_leg(&self, from: &Stop, to: &Stop) -> Leg {
        for strategy in &self.strategies {
            match strategy.resolve(from.point, to.point) {
                Ok(polyline) => return leg(from, to, polyline, strategy.source()),
                Err(err) if err.is_provider_failure() => {
                    warn!(from = %from.id, to = %to.id, error = %err, "routing provider failed, falling back");
                }
                Err(err) => {
                    debug!(from = %from.id, to = %to.id, source = ?strategy.source(), error = %err, "leg strategy failed");
                }
            }
        }

        leg(
            from,
            to,
            Polyline::straight(from.point, to.point),
            LegSource::StraightLine,
        )
    }
}

fn leg(from: &Stop, to: &Stop, polyline: Polyline, source: LegSource) -> Leg {
    Leg {
        from_id: from.id.clone(),
        to_id: to.id.clone(),
        distance_km: polyline.length_km(),
        polyline,
        source,
    }
}
