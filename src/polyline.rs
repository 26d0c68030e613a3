//! Polyline representation for route geometries.
//!
//! Geometries are kept as decoded coordinate sequences. Any compact
//! encoding belongs at the API boundary, not inside the router.

use serde::{Deserialize, Serialize};

use crate::haversine;
use crate::model::Point;

/// A route geometry as an ordered list of points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Two-point line between `from` and `to`.
    pub fn straight(from: Point, to: Point) -> Self {
        Self::new(vec![from, to])
    }

    /// Builds a polyline, dropping points equal to their predecessor.
    pub fn stitched(points: impl IntoIterator<Item = Point>) -> Self {
        let mut out: Vec<Point> = Vec::new();
        for point in points {
            if out.last() != Some(&point) {
                out.push(point);
            }
        }
        Self::new(out)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Sum of haversine distances between consecutive points.
    pub fn length_km(&self) -> f64 {
        haversine::path_length_km(&self.points)
    }
}
