//! Weighted road graph used by the shortest-path solver.
//!
//! Two builders are provided: a synthetic lattice over a bounding region,
//! standing in for a street network, and a crowd-sourced graph whose nodes
//! are historical pickup coordinates joined when they lie close together.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Connectivity, GraphConfig, GraphStrategy, MIN_LATTICE_NODES, MIN_LATTICE_SPACING_KM};
use crate::error::{Error, Result};
use crate::haversine::{self, KM_PER_DEGREE};
use crate::model::Point;
use crate::traits::HistoryProvider;

/// Smallest cosine used when converting km to degrees of longitude.
const MIN_LATITUDE_COSINE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Observed pickup coordinate.
    Real,
    /// Lattice intersection.
    Synthetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: usize,
    pub point: Point,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Grid,
    GridDiagonal,
    RealRoute,
}

/// Undirected edge; stored once here and twice in the adjacency lists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    /// Always finite and non-negative.
    pub weight: f64,
    pub road_type: RoadType,
}

#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, point: Point, kind: NodeKind) -> usize {
        let id = self.nodes.len();
        self.nodes.push(GraphNode { id, point, kind });
        self.adjacency.push(Vec::new());
        id
    }

    /// Connects two nodes both ways, weighted by their haversine distance.
    pub fn add_edge(&mut self, from: usize, to: usize, road_type: RoadType) -> Result<()> {
        let (a, b) = (self.checked_node(from)?, self.checked_node(to)?);
        let weight = haversine::distance_km(a.point, b.point);
        self.push_edge(from, to, weight, road_type);
        Ok(())
    }

    /// Connects two nodes both ways with an explicit weight.
    pub fn add_weighted_edge(
        &mut self,
        from: usize,
        to: usize,
        weight: f64,
        road_type: RoadType,
    ) -> Result<()> {
        self.checked_node(from)?;
        self.checked_node(to)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::invalid_input(format!(
                "edge {from}-{to} has invalid weight {weight}"
            )));
        }
        self.push_edge(from, to, weight, road_type);
        Ok(())
    }

    fn push_edge(&mut self, from: usize, to: usize, weight: f64, road_type: RoadType) {
        self.edges.push(GraphEdge {
            from,
            to,
            weight,
            road_type,
        });
        self.adjacency[from].push((to, weight));
        if from != to {
            self.adjacency[to].push((from, weight));
        }
    }

    fn checked_node(&self, id: usize) -> Result<&GraphNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| Error::invalid_input(format!("graph node {id} does not exist")))
    }

    pub fn node(&self, id: usize) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// `(neighbor, weight)` pairs reachable from `id`.
    pub fn neighbors(&self, id: usize) -> &[(usize, f64)] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Closest node to `point` and its distance; lowest id wins ties.
    pub fn nearest_node(&self, point: Point) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for node in &self.nodes {
            let dist = haversine::distance_km(point, node.point);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((node.id, dist)),
            }
        }
        best
    }
}

/// Latitude/longitude rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest box covering `points`, grown by `padding_km` on every side.
    pub fn around(points: &[Point], padding_km: f64) -> Option<Self> {
        let first = points.first()?;
        let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
        let (mut min_lng, mut max_lng) = (first.longitude, first.longitude);
        for point in &points[1..] {
            min_lat = min_lat.min(point.latitude);
            max_lat = max_lat.max(point.latitude);
            min_lng = min_lng.min(point.longitude);
            max_lng = max_lng.max(point.longitude);
        }

        let mid_lat = (min_lat + max_lat) / 2.0;
        let pad_lat = padding_km / KM_PER_DEGREE;
        let pad_lng = padding_km / longitude_km_per_degree(mid_lat);

        Some(Self {
            min: Point::new((min_lat - pad_lat).max(-90.0), (min_lng - pad_lng).max(-180.0)),
            max: Point::new((max_lat + pad_lat).min(90.0), (max_lng + pad_lng).min(180.0)),
        })
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min.latitude..=self.max.latitude).contains(&point.latitude)
            && (self.min.longitude..=self.max.longitude).contains(&point.longitude)
    }

    fn mid_latitude(&self) -> f64 {
        (self.min.latitude + self.max.latitude) / 2.0
    }
}

fn longitude_km_per_degree(latitude: f64) -> f64 {
    KM_PER_DEGREE * latitude.to_radians().cos().max(MIN_LATITUDE_COSINE)
}

/// Grid of synthetic intersections covering `bounds`.
///
/// Rows run south to north and columns west to east; node id is
/// `row * cols + col`. When the requested spacing would exceed `max_nodes`
/// the spacing is widened until the grid fits.
pub fn build_lattice(
    bounds: BoundingBox,
    spacing_km: f64,
    connectivity: Connectivity,
    max_nodes: usize,
) -> Result<RoadGraph> {
    if !spacing_km.is_finite() || spacing_km < MIN_LATTICE_SPACING_KM {
        return Err(Error::invalid_input(format!(
            "lattice spacing must be at least {MIN_LATTICE_SPACING_KM} km, got {spacing_km}"
        )));
    }
    if max_nodes < MIN_LATTICE_NODES {
        return Err(Error::invalid_input(format!(
            "max lattice nodes must be at least {MIN_LATTICE_NODES}, got {max_nodes}"
        )));
    }

    let lat_span = (bounds.max.latitude - bounds.min.latitude).max(0.0);
    let lng_span = (bounds.max.longitude - bounds.min.longitude).max(0.0);
    let lng_km_per_degree = longitude_km_per_degree(bounds.mid_latitude());

    let mut spacing = spacing_km;
    let (rows, cols) = loop {
        let rows = ((lat_span * KM_PER_DEGREE / spacing).ceil() as usize).saturating_add(1);
        let cols = ((lng_span * lng_km_per_degree / spacing).ceil() as usize).saturating_add(1);
        if rows.saturating_mul(cols) <= max_nodes {
            break (rows, cols);
        }
        let factor = (rows as f64 * cols as f64 / max_nodes as f64).sqrt();
        spacing *= factor.max(1.01);
        if !spacing.is_finite() {
            return Err(Error::invalid_input(format!(
                "lattice over {lat_span} x {lng_span} degrees cannot fit {max_nodes} nodes"
            )));
        }
    };
    if spacing > spacing_km {
        debug!(requested_km = spacing_km, used_km = spacing, "widened lattice spacing");
    }

    let lat_step = spacing / KM_PER_DEGREE;
    let lng_step = spacing / lng_km_per_degree;

    let mut graph = RoadGraph::new();
    for row in 0..rows {
        for col in 0..cols {
            let lat = (bounds.min.latitude + row as f64 * lat_step).min(90.0);
            let lng = (bounds.min.longitude + col as f64 * lng_step).min(180.0);
            graph.add_node(Point::new(lat, lng), NodeKind::Synthetic);
        }
    }

    let id = |row: usize, col: usize| row * cols + col;
    for row in 0..rows {
        for col in 0..cols {
            if col + 1 < cols {
                graph.add_edge(id(row, col), id(row, col + 1), RoadType::Grid)?;
            }
            if row + 1 < rows {
                graph.add_edge(id(row, col), id(row + 1, col), RoadType::Grid)?;
                if connectivity == Connectivity::Eight {
                    if col + 1 < cols {
                        graph.add_edge(id(row, col), id(row + 1, col + 1), RoadType::GridDiagonal)?;
                    }
                    if col > 0 {
                        graph.add_edge(id(row, col), id(row + 1, col - 1), RoadType::GridDiagonal)?;
                    }
                }
            }
        }
    }

    debug!(
        rows,
        cols,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built lattice graph"
    );
    Ok(graph)
}

/// Graph of observed pickup coordinates, joining pairs closer than
/// `proximity_km`.
///
/// Identical coordinates (to 6 decimal places) collapse into one node.
pub fn build_crowd_sourced(history: &[Point], proximity_km: f64) -> Result<RoadGraph> {
    if !proximity_km.is_finite() || proximity_km <= 0.0 {
        return Err(Error::invalid_input(format!(
            "proximity threshold must be positive, got {proximity_km}"
        )));
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut graph = RoadGraph::new();
    for point in history {
        if point.validate().is_err() {
            continue;
        }
        if seen.insert(location_key(*point)) {
            graph.add_node(*point, NodeKind::Real);
        }
    }

    let points: Vec<Point> = graph.nodes().iter().map(|node| node.point).collect();
    let neighbor_lists: Vec<Vec<usize>> = (0..points.len())
        .into_par_iter()
        .map(|i| {
            ((i + 1)..points.len())
                .filter(|&j| haversine::distance_km(points[i], points[j]) < proximity_km)
                .collect()
        })
        .collect();

    for (i, neighbors) in neighbor_lists.into_iter().enumerate() {
        for j in neighbors {
            graph.add_edge(i, j, RoadType::RealRoute)?;
        }
    }

    debug!(
        records = history.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built crowd-sourced graph"
    );
    Ok(graph)
}

fn location_key(point: Point) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}

/// Builds the internal graph for one request according to `config`.
///
/// The crowd-sourced strategy falls back to the lattice when no history
/// collaborator is present, when it fails, or when it returns nothing.
/// Returns `None` only for [`GraphStrategy::Disabled`] or an unusable
/// lattice configuration.
pub fn build_for_points(
    points: &[Point],
    config: &GraphConfig,
    history: Option<&dyn HistoryProvider>,
) -> Option<RoadGraph> {
    match config.strategy {
        GraphStrategy::Disabled => return None,
        GraphStrategy::CrowdSourced => match crowd_sourced_from(history, config) {
            Some(graph) => return Some(graph),
            None => debug!("crowd-sourced graph unavailable, using lattice"),
        },
        GraphStrategy::Lattice => {}
    }

    let bounds = BoundingBox::around(points, config.lattice_spacing_km)?;
    match build_lattice(
        bounds,
        config.lattice_spacing_km,
        config.connectivity,
        config.max_lattice_nodes,
    ) {
        Ok(graph) => Some(graph),
        Err(err) => {
            warn!(error = %err, "lattice graph construction failed");
            None
        }
    }
}

fn crowd_sourced_from(
    history: Option<&dyn HistoryProvider>,
    config: &GraphConfig,
) -> Option<RoadGraph> {
    let records = match history?.recent_pickups(config.history_limit) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "pickup history unavailable");
            return None;
        }
    };
    let records = &records[..records.len().min(config.history_limit)];
    if records.is_empty() {
        return None;
    }
    match build_crowd_sourced(records, config.proximity_threshold_km) {
        Ok(graph) if !graph.is_empty() => Some(graph),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "crowd-sourced graph construction failed");
            None
        }
    }
}

/// Process-wide graph holder: built once, then shared read-only.
///
/// Readers receive an `Arc` snapshot, so a rebuild swapping in a new graph
/// never exposes a partially built one.
#[derive(Debug, Default)]
pub struct GraphCache {
    graph: RwLock<Option<Arc<RoadGraph>>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<RoadGraph>> {
        match self.graph.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the cached graph, building it with `build` on first use.
    pub fn get_or_build<F>(&self, build: F) -> Result<Arc<RoadGraph>>
    where
        F: FnOnce() -> Result<RoadGraph>,
    {
        if let Some(graph) = self.get() {
            return Ok(graph);
        }

        let mut guard = match self.graph.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(graph) = guard.as_ref() {
            return Ok(Arc::clone(graph));
        }
        let graph = Arc::new(build()?);
        *guard = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Swaps in a freshly built graph; existing readers keep their snapshot.
    pub fn replace(&self, graph: RoadGraph) -> Arc<RoadGraph> {
        let graph = Arc::new(graph);
        let mut guard = match self.graph.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(Arc::clone(&graph));
        graph
    }
}
