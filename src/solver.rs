//! Route optimization pipeline.
//!
//! pickups + depot -> clusters -> per-cluster tours -> assembled legs ->
//! metrics. Each call owns all of its intermediate state.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::assembler::{GraphLegs, ProviderLegs, RouteAssembler, Stop};
use crate::cluster;
use crate::config::{CostModel, OptimizeConfig};
use crate::error::{Error, Result};
use crate::graph::{self, RoadGraph};
use crate::metrics;
use crate::model::{DEPOT_ID, Leg, OptimizeRequest, OptimizedRoute, PickupLocation, Point, VehicleType};
use crate::traits::{HistoryProvider, RoutingProvider};
use crate::tsp;

/// Optional external collaborators for one optimization call.
#[derive(Clone, Copy, Default)]
pub struct Collaborators<'a> {
    pub provider: Option<&'a dyn RoutingProvider>,
    pub history: Option<&'a dyn HistoryProvider>,
    /// Prebuilt graph, e.g. from a [`graph::GraphCache`]; takes precedence
    /// over building one per request.
    pub graph: Option<&'a Arc<RoadGraph>>,
}

impl<'a> Collaborators<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: &'a dyn RoutingProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_history(mut self, history: &'a dyn HistoryProvider) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_graph(mut self, graph: &'a Arc<RoadGraph>) -> Self {
        self.graph = Some(graph);
        self
    }
}

/// Orders the request's pickups and resolves the route between them.
///
/// Fails only with [`Error::InvalidInput`]; routing failures on individual
/// legs degrade to lower-fidelity geometry instead.
#[instrument(skip_all, fields(pickups = request.pickups.len(), vehicle = ?request.vehicle_type))]
pub fn optimize(request: &OptimizeRequest, collaborators: &Collaborators<'_>) -> Result<OptimizedRoute> {
    let config = request.config.clone().unwrap_or_default();
    validate(request, &config)?;

    let clusters = cluster::cluster_pickups(&request.pickups, config.max_cluster_size)?;

    let mut ordered: Vec<&PickupLocation> = Vec::with_capacity(request.pickups.len());
    let mut cluster_ids: Vec<Vec<String>> = Vec::with_capacity(clusters.len());
    let mut two_opt_swaps = 0;
    let mut anchor = request.depot;

    for cluster in &clusters {
        let destinations: Vec<Point> = cluster.pickups.iter().map(|p| p.point).collect();
        let tour = tsp::solve(anchor, &destinations, config.two_opt_iteration_cap);
        debug!(
            cluster = cluster.index,
            size = cluster.len(),
            construction_km = tour.construction_distance_km,
            improved_km = tour.distance_km,
            swaps = tour.swaps,
            "cluster tour"
        );

        let visited: Vec<&PickupLocation> = tour.order.iter().map(|&i| cluster.pickups[i]).collect();
        if let Some(last) = visited.last() {
            anchor = last.point;
        }
        cluster_ids.push(visited.iter().map(|p| p.id.clone()).collect());
        ordered.extend(visited);
        two_opt_swaps += tour.swaps;
    }

    let mut stops: Vec<Stop> = Vec::with_capacity(ordered.len() + 2);
    stops.push(Stop::new(DEPOT_ID, request.depot));
    stops.extend(ordered.iter().map(|p| Stop::new(p.id.clone(), p.point)));
    if config.return_to_depot {
        stops.push(Stop::new(DEPOT_ID, request.depot));
    }

    let all_points: Vec<Point> = stops.iter().map(|stop| stop.point).collect();
    let graph = resolve_graph(&all_points, &config, collaborators);
    let legs = build_assembler(request.vehicle_type, &config, collaborators, graph.as_deref()).assemble(&stops);

    let cost = CostModel::new(request.vehicle_type, &config);
    let baseline_km = metrics::baseline_distance_km(request.depot, &request.pickups, config.return_to_depot);
    let metrics = metrics::calculate(&legs, baseline_km, &cost);

    let route = OptimizedRoute {
        ordered_stops: ordered.iter().map(|p| p.id.clone()).collect(),
        legs,
        metrics,
        clusters: cluster_ids,
        two_opt_swaps,
        total_weight_kg: request.pickups.iter().map(|p| p.estimated_weight).sum(),
        total_points_value: request
            .pickups
            .iter()
            .filter_map(|p| p.points_value)
            .map(u64::from)
            .sum(),
    };

    info!(
        stops = route.ordered_stops.len(),
        clusters = route.clusters.len(),
        distance_km = route.metrics.total_distance_km,
        straight_line_legs = route.straight_line_legs(),
        "route optimized"
    );
    Ok(route)
}

/// Answers a single origin-destination query through the same fallback
/// chain as route legs.
#[instrument(skip(config, collaborators))]
pub fn route_point_to_point(
    origin: Point,
    destination: Point,
    vehicle_type: VehicleType,
    config: &OptimizeConfig,
    collaborators: &Collaborators<'_>,
) -> Result<Leg> {
    origin.validate()?;
    destination.validate()?;
    config.graph.validate().map_err(|err| in_context("graph config", err))?;

    let graph = resolve_graph(&[origin, destination], config, collaborators);
    let assembler = build_assembler(vehicle_type, config, collaborators, graph.as_deref());
    Ok(assembler.resolve_leg(
        &Stop::new("origin", origin),
        &Stop::new("destination", destination),
    ))
}

fn resolve_graph(
    points: &[Point],
    config: &OptimizeConfig,
    collaborators: &Collaborators<'_>,
) -> Option<Arc<RoadGraph>> {
    if let Some(graph) = collaborators.graph {
        return Some(Arc::clone(graph));
    }
    graph::build_for_points(points, &config.graph, collaborators.history).map(Arc::new)
}

fn build_assembler<'a>(
    vehicle_type: VehicleType,
    config: &OptimizeConfig,
    collaborators: &Collaborators<'a>,
    graph: Option<&'a RoadGraph>,
) -> RouteAssembler<'a> {
    let mut assembler = RouteAssembler::new();
    if let Some(provider) = collaborators.provider {
        assembler = assembler.with_strategy(ProviderLegs::new(
            provider,
            vehicle_type.profile().provider_profile,
            config.provider_timeout(),
        ));
    }
    if let Some(graph) = graph {
        assembler = assembler.with_strategy(GraphLegs::new(graph, config.graph.snap_radius_km));
    }
    assembler
}

fn validate(request: &OptimizeRequest, config: &OptimizeConfig) -> Result<()> {
    request.depot.validate().map_err(|err| in_context("depot", err))?;

    if request.pickups.is_empty() {
        return Err(Error::invalid_input("pickup list is empty"));
    }
    if config.max_cluster_size == 0 {
        return Err(Error::invalid_input("max cluster size must be at least 1"));
    }
    config.graph.validate().map_err(|err| in_context("graph config", err))?;

    let mut seen: HashSet<&str> = HashSet::with_capacity(request.pickups.len());
    for pickup in &request.pickups {
        if pickup.id.is_empty() {
            return Err(Error::invalid_input("pickup id is empty"));
        }
        if pickup.id == DEPOT_ID {
            return Err(Error::invalid_input(format!("pickup id {DEPOT_ID:?} is reserved")));
        }
        if !seen.insert(pickup.id.as_str()) {
            return Err(Error::invalid_input(format!("duplicate pickup id {:?}", pickup.id)));
        }
        pickup
            .point
            .validate()
            .map_err(|err| in_context(&format!("pickup {}", pickup.id), err))?;
        if !pickup.estimated_weight.is_finite() || pickup.estimated_weight < 0.0 {
            return Err(Error::invalid_input(format!(
                "pickup {} has invalid weight {}",
                pickup.id, pickup.estimated_weight
            )));
        }
    }

    Ok(())
}

fn in_context(what: &str, err: Error) -> Error {
    match err {
        Error::InvalidInput(message) => Error::InvalidInput(format!("{what}: {message}")),
        other => other,
    }
}
