//! OSRM HTTP adapter for segment routing.

use serde::Deserialize;

use crate::cache::coordinate_pair;
use crate::error::DirectionsError;
use crate::geo::{haversine_m, Coordinate};
use crate::traits::{DirectionsProvider, DirectionsResponse, TravelMode};

/// Reason reported for endpoints closer than `min_distance_m`.
pub const TOO_CLOSE_REASON: &str = "TOO_CLOSE";

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub walking_profile: String,
    pub driving_profile: String,
    pub timeout_secs: u64,
    /// Endpoints closer than this are refused without a request.
    pub min_distance_m: f64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            walking_profile: "foot".to_string(),
            driving_profile: "car".to_string(),
            timeout_secs: 5,
            min_distance_m: 5.0,
        }
    }
}

impl OsrmConfig {
    pub fn profile(&self, mode: TravelMode) -> &str {
        match mode {
            TravelMode::Walking => &self.walking_profile,
            TravelMode::Driving => &self.driving_profile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, from: Coordinate, to: Coordinate, mode: TravelMode) -> String {
        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile(mode),
            coordinate_pair(from, to)
        )
    }
}

impl DirectionsProvider for OsrmClient {
    fn directions(
        &self,
        from: Coordinate,
        to: Coordinate,
        mode: TravelMode,
    ) -> Result<DirectionsResponse, DirectionsError> {
        if haversine_m(from, to) < self.config.min_distance_m {
            return Ok(DirectionsResponse::Fallback {
                reason: TOO_CLOSE_REASON.to_string(),
            });
        }

        let body = self
            .client
            .get(self.route_url(from, to, mode))
            .send()?
            .json::<OsrmRouteResponse>()?;

        body.into_response()
    }
}

// OSRM reports NoRoute and friends with a 400 and a JSON body, so the
// status is not checked before decoding.
#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OsrmRouteResponse {
    fn into_response(self) -> Result<DirectionsResponse, DirectionsError> {
        if self.code != "Ok" {
            return Err(DirectionsError::Service {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| DirectionsError::Malformed("OSRM response has no routes".to_string()))?;

        Ok(DirectionsResponse::Route(
            route
                .geometry
                .coordinates
                .into_iter()
                .map(Coordinate::from_lng_lat)
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_uses_mode_profile() {
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://osrm.example.com/".to_string(),
            ..OsrmConfig::default()
        })
        .expect("client");
        let a = Coordinate::new(37.5, 127.0);
        let b = Coordinate::new(37.501, 127.001);

        assert_eq!(
            client.route_url(a, b, TravelMode::Walking),
            "http://osrm.example.com/route/v1/foot/127.000000,37.500000;127.001000,37.501000\
             ?overview=full&geometries=geojson"
        );
        assert!(client.route_url(a, b, TravelMode::Driving).contains("/route/v1/car/"));
    }

    #[test]
    fn test_close_endpoints_refused_without_request() {
        // Unroutable port: a request would fail, not return TOO_CLOSE.
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..OsrmConfig::default()
        })
        .expect("client");
        let a = Coordinate::new(37.5, 127.0);
        let b = Coordinate::new(37.50001, 127.00001);

        let response = client.directions(a, b, TravelMode::Walking).expect("fallback");
        assert_eq!(
            response,
            DirectionsResponse::Fallback {
                reason: TOO_CLOSE_REASON.to_string()
            }
        );
    }

    #[test]
    fn test_parse_ok_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[127.0, 37.5], [127.001, 37.501]]
                },
                "distance": 140.2
            }]
        }"#;
        let body: OsrmRouteResponse = serde_json::from_str(json).expect("should deserialise");
        let response = body.into_response().expect("route");
        assert_eq!(
            response,
            DirectionsResponse::Route(vec![
                Coordinate::new(37.5, 127.0),
                Coordinate::new(37.501, 127.001)
            ])
        );
    }

    #[test]
    fn test_parse_no_route() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let body: OsrmRouteResponse = serde_json::from_str(json).expect("should deserialise");
        match body.into_response() {
            Err(DirectionsError::Service { code, .. }) => assert_eq!(code, "NoRoute"),
            other => panic!("expected service error, got {:?}", other),
        }
    }
}
