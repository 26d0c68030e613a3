//! Open-path tour construction from a fixed anchor.
//!
//! Nearest-neighbor builds an initial order, then 2-opt reverses segments
//! while that strictly shortens the path. The anchor never moves and the
//! path does not return to it.

use crate::haversine;
use crate::model::Point;

/// Improvements smaller than this are treated as floating noise.
const IMPROVEMENT_EPSILON: f64 = 1e-10;

/// A visiting order over a set of destinations.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    /// Indices into the destination slice, in visiting order.
    pub order: Vec<usize>,
    pub distance_km: f64,
    /// Length of the nearest-neighbor order before improvement.
    pub construction_distance_km: f64,
    /// Improving 2-opt moves applied.
    pub swaps: usize,
    /// Full 2-opt passes run, including the final non-improving one.
    pub passes: usize,
}

/// Builds and improves a tour starting at `anchor`.
///
/// `iteration_cap` bounds the number of 2-opt passes; zero skips
/// improvement entirely.
pub fn solve(anchor: Point, destinations: &[Point], iteration_cap: usize) -> Tour {
    let matrix = anchored_matrix(anchor, destinations);
    let construction = nearest_neighbor_order(&matrix);
    let construction_distance_km = path_distance(&matrix, &construction);

    let (order, swaps, passes) = two_opt(&matrix, construction, iteration_cap);
    let distance_km = path_distance(&matrix, &order);

    Tour {
        order,
        distance_km,
        construction_distance_km,
        swaps,
        passes,
    }
}

/// Nearest-neighbor order from `anchor`; ties go to the earliest destination.
pub fn nearest_neighbor(anchor: Point, destinations: &[Point]) -> Vec<usize> {
    nearest_neighbor_order(&anchored_matrix(anchor, destinations))
}

/// Length of visiting `destinations` in `order` starting from `anchor`.
pub fn tour_distance(anchor: Point, destinations: &[Point], order: &[usize]) -> f64 {
    path_distance(&anchored_matrix(anchor, destinations), order)
}

/// Distance matrix with the anchor at index 0 and destination `i` at `i + 1`.
fn anchored_matrix(anchor: Point, destinations: &[Point]) -> Vec<Vec<f64>> {
    let mut points = Vec::with_capacity(destinations.len() + 1);
    points.push(anchor);
    points.extend_from_slice(destinations);
    haversine::distance_matrix(&points)
}

fn nearest_neighbor_order(matrix: &[Vec<f64>]) -> Vec<usize> {
    let n = matrix.len().saturating_sub(1);
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = 0;

    for _ in 0..n {
        let mut best: Option<(usize, f64)> = None;
        for (dest, seen) in visited.iter().enumerate() {
            if *seen {
                continue;
            }
            let dist = matrix[current][dest + 1];
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((dest, dist)),
            }
        }
        let Some((next, _)) = best else { break };
        visited[next] = true;
        order.push(next);
        current = next + 1;
    }

    order
}

fn path_distance(matrix: &[Vec<f64>], order: &[usize]) -> f64 {
    let mut current = 0;
    let mut total = 0.0;
    for &dest in order {
        total += matrix[current][dest + 1];
        current = dest + 1;
    }
    total
}

/// First-improvement 2-opt over the open path `anchor, order...`.
///
/// Returns the improved order, the number of moves applied and the number
/// of passes run.
fn two_opt(matrix: &[Vec<f64>], order: Vec<usize>, iteration_cap: usize) -> (Vec<usize>, usize, usize) {
    // path[0] is the anchor; path[k] for k >= 1 is a matrix index
    let mut path: Vec<usize> = std::iter::once(0).chain(order.iter().map(|d| d + 1)).collect();
    let last = path.len() - 1;
    let mut swaps = 0;
    let mut passes = 0;

    if last >= 2 {
        while passes < iteration_cap {
            passes += 1;
            let mut improved = false;

            for i in 0..last - 1 {
                for j in (i + 2)..=last {
                    let (a, b, c) = (path[i], path[i + 1], path[j]);
                    let mut delta = matrix[a][c] - matrix[a][b];
                    if j < last {
                        let d = path[j + 1];
                        delta += matrix[b][d] - matrix[c][d];
                    }
                    if delta < -IMPROVEMENT_EPSILON {
                        path[i + 1..=j].reverse();
                        swaps += 1;
                        improved = true;
                    }
                }
            }

            if !improved {
                break;
            }
        }
    }

    let order = path.into_iter().skip(1).map(|k| k - 1).collect();
    (order, swaps, passes)
}
