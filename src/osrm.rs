//! OSRM HTTP adapter for leg geometries.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Point;
use crate::polyline::Polyline;
use crate::traits::{ProviderRequest, ProviderRoute, RoutingProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    /// Client-wide ceiling; each request also carries its own timeout.
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, request: &ProviderRequest) -> String {
        let coords = request
            .coordinates
            .iter()
            .map(|[lng, lat]| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            request.vehicle_profile,
            coords
        )
    }
}

impl RoutingProvider for OsrmClient {
    fn route(&self, request: &ProviderRequest) -> Result<ProviderRoute> {
        let url = self.route_url(request);
        debug!(%url, "requesting OSRM route");

        let body = self
            .client
            .get(url)
            .timeout(request.timeout)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())?;

        body.into_route()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// `[lng, lat]` pairs.
    coordinates: Vec<[f64; 2]>,
}

impl OsrmRouteResponse {
    fn into_route(self) -> Result<ProviderRoute> {
        if self.code != "Ok" {
            return Err(Error::provider_unavailable(format!(
                "OSRM returned {}: {}",
                self.code,
                self.message.unwrap_or_default()
            )));
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider_unavailable("OSRM returned no routes"))?;

        let points: Vec<Point> = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| Point::new(lat, lng))
            .collect();
        if points.len() < 2 {
            return Err(Error::provider_unavailable("OSRM geometry has fewer than two points"));
        }

        Ok(ProviderRoute {
            distance_km: route.distance / 1000.0,
            duration_hours: route.duration / 3600.0,
            polyline: Polyline::new(points),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest::new(
            Point::new(36.1147, -115.1728),
            Point::new(36.1727, -115.1580),
            "car",
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://osrm.local:5000/".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(
            client.route_url(&request()),
            "http://osrm.local:5000/route/v1/car/-115.172800,36.114700;-115.158000,36.172700?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_parses_route_response() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 7250.5,
                "duration": 720.0,
                "geometry": {"type": "LineString", "coordinates": [[-115.1728, 36.1147], [-115.17, 36.14], [-115.158, 36.1727]]}
            }],
            "waypoints": []
        }"#;
        let parsed: OsrmRouteResponse = serde_json::from_str(body).unwrap();
        let route = parsed.into_route().unwrap();

        assert!((route.distance_km - 7.2505).abs() < 1e-9);
        assert!((route.duration_hours - 0.2).abs() < 1e-9);
        assert_eq!(route.polyline.len(), 3);
        assert_eq!(route.polyline.first(), Some(Point::new(36.1147, -115.1728)));
    }

    #[test]
    fn test_error_code_is_unavailable() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let parsed: OsrmRouteResponse = serde_json::from_str(body).unwrap();
        match parsed.into_route() {
            Err(Error::ProviderUnavailable(msg)) => assert!(msg.contains("NoRoute")),
            other => panic!("expected ProviderUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_geometry_is_unavailable() {
        let body = r#"{"code": "Ok", "routes": [{"distance": 0.0, "duration": 0.0, "geometry": {"coordinates": [[0.0, 0.0]]}}]}"#;
        let parsed: OsrmRouteResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.into_route().is_err());
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        let err = client.route(&request()).unwrap_err();
        assert!(err.is_provider_failure());
    }
}
