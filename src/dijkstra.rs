//! Dijkstra shortest paths over a [`RoadGraph`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::graph::RoadGraph;
use crate::model::Point;
use crate::polyline::Polyline;

/// A resolved path through the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Node ids from source to target, inclusive.
    pub nodes: Vec<usize>,
    pub polyline: Polyline,
    pub distance_km: f64,
}

/// Heap entry ordered so the `BinaryHeap` pops the smallest cost first,
/// breaking ties on the lower node id.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    cost: f64,
    node: usize,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Minimum-weight path between two graph nodes.
///
/// `distance_km` is the summed edge weight. Fails with
/// [`Error::NoPathFound`] when `to` is unreachable from `from`.
pub fn shortest_path(graph: &RoadGraph, from: usize, to: usize) -> Result<ShortestPath> {
    let (source, target) = match (graph.node(from), graph.node(to)) {
        (Some(source), Some(target)) => (source, target),
        _ => {
            return Err(Error::invalid_input(format!(
                "path endpoints {from} and {to} must both be graph nodes"
            )));
        }
    };

    if from == to {
        return Ok(ShortestPath {
            nodes: vec![from],
            polyline: Polyline::new(vec![source.point]),
            distance_km: 0.0,
        });
    }

    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut settled = vec![false; n];

    dist[from] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(Frontier {
        cost: 0.0,
        node: from,
    });

    while let Some(Frontier { cost, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        if node == to {
            break;
        }

        for &(neighbor, weight) in graph.neighbors(node) {
            if settled[neighbor] {
                continue;
            }
            let candidate = cost + weight;
            if candidate < dist[neighbor] {
                dist[neighbor] = candidate;
                prev[neighbor] = Some(node);
                heap.push(Frontier {
                    cost: candidate,
                    node: neighbor,
                });
            }
        }
    }

    if !settled[to] {
        return Err(Error::NoPathFound { from, to });
    }

    let mut nodes = vec![to];
    let mut current = to;
    while let Some(previous) = prev[current] {
        nodes.push(previous);
        current = previous;
    }
    nodes.reverse();

    let points = nodes
        .iter()
        .filter_map(|&id| graph.node(id).map(|node| node.point))
        .collect();

    Ok(ShortestPath {
        nodes,
        polyline: Polyline::new(points),
        distance_km: dist[target.id],
    })
}

/// Shortest route between two arbitrary coordinates.
///
/// Both points are snapped to their nearest node; either one lying farther
/// than `snap_radius_km` from every node fails with [`Error::NoNearbyNode`].
/// The returned polyline starts at `origin`, follows the node path and ends
/// at `destination`, and `distance_km` is its full length.
pub fn route_between(
    graph: &RoadGraph,
    origin: Point,
    destination: Point,
    snap_radius_km: f64,
) -> Result<ShortestPath> {
    let from = snap(graph, origin, snap_radius_km)?;
    let to = snap(graph, destination, snap_radius_km)?;
    let path = shortest_path(graph, from, to)?;

    let polyline = Polyline::stitched(
        std::iter::once(origin)
            .chain(path.polyline.into_points())
            .chain(std::iter::once(destination)),
    );
    let distance_km = polyline.length_km();

    Ok(ShortestPath {
        nodes: path.nodes,
        polyline,
        distance_km,
    })
}

fn snap(graph: &RoadGraph, point: Point, radius_km: f64) -> Result<usize> {
    match graph.nearest_node(point) {
        Some((id, dist)) if dist <= radius_km => Ok(id),
        _ => Err(Error::NoNearbyNode {
            latitude: point.latitude,
            longitude: point.longitude,
            radius_km,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Connectivity;
    use crate::graph::{build_lattice, BoundingBox, NodeKind, RoadType};
    use crate::haversine;

    /// Square a-b-c-d with a cheap diagonal a-c.
    ///
    /// ```text
    /// d ---- c
    /// |    / |
    /// |  /   |
    /// a ---- b
    /// ```
    fn square_with_shortcut() -> RoadGraph {
        let mut graph = RoadGraph::new();
        let a = graph.add_node(Point::new(0.0, 0.0), NodeKind::Real);
        let b = graph.add_node(Point::new(0.0, 0.01), NodeKind::Real);
        let c = graph.add_node(Point::new(0.01, 0.01), NodeKind::Real);
        let d = graph.add_node(Point::new(0.01, 0.0), NodeKind::Real);
        graph.add_weighted_edge(a, b, 1.0, RoadType::Grid).unwrap();
        graph.add_weighted_edge(b, c, 1.0, RoadType::Grid).unwrap();
        graph.add_weighted_edge(c, d, 1.0, RoadType::Grid).unwrap();
        graph.add_weighted_edge(d, a, 1.0, RoadType::Grid).unwrap();
        graph.add_weighted_edge(a, c, 1.5, RoadType::GridDiagonal).unwrap();
        graph
    }

    #[test]
    fn test_takes_diagonal_shortcut() {
        let graph = square_with_shortcut();
        let path = shortest_path(&graph, 0, 2).unwrap();
        assert_eq!(path.nodes, vec![0, 2]);
        assert_eq!(path.distance_km, 1.5);
        assert_eq!(path.polyline.len(), 2);
    }

    #[test]
    fn test_prefers_minimum_weight_over_fewest_hops() {
        // a-c is one hop but heavier than going around through b
        let mut graph = RoadGraph::new();
        for point in [(0.0, 0.0), (0.0, 0.01), (0.01, 0.01), (0.01, 0.0)] {
            graph.add_node(point.into(), NodeKind::Real);
        }
        graph.add_weighted_edge(0, 2, 3.0, RoadType::GridDiagonal).unwrap();
        graph.add_weighted_edge(0, 1, 1.0, RoadType::Grid).unwrap();
        graph.add_weighted_edge(1, 2, 1.0, RoadType::Grid).unwrap();
        graph.add_weighted_edge(2, 3, 2.0, RoadType::Grid).unwrap();
        graph.add_weighted_edge(3, 0, 2.0, RoadType::Grid).unwrap();

        let path = shortest_path(&graph, 0, 2).unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(path.distance_km, 2.0);
    }

    #[test]
    fn test_same_node_is_single_point() {
        let graph = square_with_shortcut();
        let path = shortest_path(&graph, 3, 3).unwrap();
        assert_eq!(path.nodes, vec![3]);
        assert_eq!(path.distance_km, 0.0);
        assert_eq!(path.polyline.points(), &[Point::new(0.01, 0.0)]);
    }

    #[test]
    fn test_disconnected_is_no_path() {
        let mut graph = square_with_shortcut();
        let island = graph.add_node(Point::new(1.0, 1.0), NodeKind::Real);
        match shortest_path(&graph, 0, island) {
            Err(Error::NoPathFound { from, to }) => {
                assert_eq!(from, 0);
                assert_eq!(to, island);
            }
            other => panic!("expected NoPathFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_node_is_invalid_input() {
        let graph = square_with_shortcut();
        assert!(matches!(shortest_path(&graph, 0, 99), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_route_between_snaps_and_extends_endpoints() {
        let graph = square_with_shortcut();
        let origin = Point::new(-0.0005, 0.0);
        let destination = Point::new(0.0105, 0.01);
        let path = route_between(&graph, origin, destination, 0.5).unwrap();

        assert_eq!(path.nodes, vec![0, 2]);
        assert_eq!(path.polyline.first(), Some(origin));
        assert_eq!(path.polyline.last(), Some(destination));
        assert_eq!(path.polyline.len(), 4);
        assert!((path.distance_km - path.polyline.length_km()).abs() < 1e-12);
    }

    #[test]
    fn test_route_between_outside_radius() {
        let graph = square_with_shortcut();
        let far = Point::new(5.0, 5.0);
        assert!(matches!(
            route_between(&graph, Point::new(0.0, 0.0), far, 1.0),
            Err(Error::NoNearbyNode { .. })
        ));
    }

    #[test]
    fn test_lattice_path_is_close_to_straight_line() {
        let bounds = BoundingBox::new(Point::new(0.0, 0.0), Point::new(0.02, 0.02));
        let graph = build_lattice(bounds, 0.2, Connectivity::Eight, 10_000).unwrap();
        let origin = Point::new(0.0, 0.0);
        let destination = Point::new(0.02, 0.02);
        let path = route_between(&graph, origin, destination, 0.5).unwrap();
        let direct = haversine::distance_km(origin, destination);

        assert!(path.distance_km >= direct - 1e-9);
        assert!(path.distance_km < direct * 1.1, "{} vs {}", path.distance_km, direct);
    }
}
