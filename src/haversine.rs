//! Great-circle geometry on a spherical earth.
//!
//! Every distance in the crate goes through [`distance_km`], so graph edge
//! weights, tour lengths and route metrics agree with each other.

use crate::model::Point;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers spanned by one degree of latitude.
pub const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Haversine distance between two points in kilometers.
///
/// Symmetric, and zero for identical points.
pub fn distance_km(from: Point, to: Point) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Initial great-circle bearing from `from` to `to`, in degrees within [0, 360).
pub fn bearing_degrees(from: Point, to: Point) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Full pairwise distance matrix, indexed by the input order.
pub fn distance_matrix(points: &[Point]) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let km = distance_km(points[i], points[j]);
            matrix[i][j] = km;
            matrix[j][i] = km;
        }
    }

    matrix
}

/// Sum of consecutive-point distances along a path.
pub fn path_length_km(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_km(pair[0], pair[1]))
        .sum()
}
