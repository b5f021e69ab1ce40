//! HTTP adapter for the application's directions endpoint.
//!
//! The endpoint takes `coordinates={lng1},{lat1};{lng2},{lat2}` and
//! `mode=walking|driving` and answers either
//! `{"coordinates": [[lng, lat], ...]}` or
//! `{"fallback": true, "reason": "..."}`.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::cache::coordinate_pair;
use crate::error::DirectionsError;
use crate::geo::Coordinate;
use crate::traits::{DirectionsProvider, DirectionsResponse, TravelMode};

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub path: String,
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            path: "/api/directions".to_string(),
            timeout_secs: 5,
        }
    }
}

impl DirectionsConfig {
    /// Reads `DIRECTIONS_BASE_URL`, `DIRECTIONS_PATH` and
    /// `DIRECTIONS_TIMEOUT_SECS`. Unset or unparsable values keep their
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("DIRECTIONS_BASE_URL").unwrap_or(defaults.base_url),
            path: lookup("DIRECTIONS_PATH").unwrap_or(defaults.path),
            timeout_secs: lookup("DIRECTIONS_TIMEOUT_SECS")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    client: reqwest::blocking::Client,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.path.trim_start_matches('/')
        )
    }
}

impl DirectionsProvider for DirectionsClient {
    fn directions(
        &self,
        from: Coordinate,
        to: Coordinate,
        mode: TravelMode,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let coordinates = coordinate_pair(from, to);
        debug!(coordinates = %coordinates, mode = %mode, "requesting directions");

        let body: DirectionsBody = self
            .client
            .get(self.endpoint())
            .query(&[("coordinates", coordinates.as_str()), ("mode", mode.as_str())])
            .send()?
            .error_for_status()?
            .json()?;

        body.into_response()
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsBody {
    #[serde(default)]
    coordinates: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    fallback: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl DirectionsBody {
    fn into_response(self) -> Result<DirectionsResponse, DirectionsError> {
        if self.fallback {
            return Ok(DirectionsResponse::Fallback {
                reason: self.reason.unwrap_or_default(),
            });
        }

        match self.coordinates {
            Some(pairs) if !pairs.is_empty() => Ok(DirectionsResponse::Route(
                pairs.into_iter().map(Coordinate::from_lng_lat).collect(),
            )),
            _ => Err(DirectionsError::Malformed(
                "response has neither coordinates nor a fallback flag".to_string(),
            )),
        }
    }
}
