//! Geospatial HTTP clients
//!
//! Nominatim (geocoding), Overpass (POI search) and OSRM (road routing). Every client is
//! stateless apart from the shared Nominatim [`RateLimiter`].

pub mod nominatim;
pub mod osrm;
pub mod overpass;
pub mod rate_limiter;

pub use nominatim::{GeocodeHit, NominatimClient, ReverseHit};
pub use osrm::OsrmClient;
pub use overpass::{OverpassClient, PlaceHit};
pub use rate_limiter::RateLimiter;

use crate::service::config::GeoConfig;
use crate::util::errors::{MapChatError, MapChatResult};
use async_trait::async_trait;
use mapchat_core_types::LngLat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    Walking,
    Cycling,
    Driving,
}

impl RouteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMode::Walking => "walking",
            RouteMode::Cycling => "cycling",
            RouteMode::Driving => "driving",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RouteMode::Walking => "Walking",
            RouteMode::Cycling => "Cycling",
            RouteMode::Driving => "Driving",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMode {
    type Err = MapChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walking" | "walk" | "foot" => Ok(RouteMode::Walking),
            "cycling" | "bike" | "bicycle" => Ok(RouteMode::Cycling),
            "driving" | "drive" | "car" => Ok(RouteMode::Driving),
            other => Err(MapChatError::validation(format!(
                "mode must be one of walking, cycling, driving (got \"{}\")",
                other
            ))),
        }
    }
}

/// A routed path for one transport mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub coordinates: Vec<LngLat>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub mode: RouteMode,
}

/// Road-routing backend. `None` covers every failure: network error, non-200, malformed
/// body, or no route found.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn fetch_route(&self, start: LngLat, end: LngLat, mode: RouteMode) -> Option<RouteResult>;
}

/// All geo clients, sharing one HTTP connection pool and one Nominatim limiter.
#[derive(Clone)]
pub struct GeoClients {
    pub nominatim: Arc<NominatimClient>,
    pub overpass: Arc<OverpassClient>,
    pub osrm: Arc<OsrmClient>,
    /// Per-request timeout applied by the shared HTTP client.
    pub request_timeout: Duration,
}

impl GeoClients {
    pub fn from_config(config: &GeoConfig, limiter: Arc<RateLimiter>) -> MapChatResult<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            nominatim: Arc::new(NominatimClient::new(
                http.clone(),
                &config.nominatim_url,
                limiter,
            )),
            overpass: Arc::new(OverpassClient::new(http.clone(), &config.overpass_url)),
            osrm: Arc::new(OsrmClient::new(http, &config.osrm_url)),
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_route_modes_and_aliases() {
        assert_eq!("Walking".parse::<RouteMode>().ok(), Some(RouteMode::Walking));
        assert_eq!("bike".parse::<RouteMode>().ok(), Some(RouteMode::Cycling));
        assert_eq!("car".parse::<RouteMode>().ok(), Some(RouteMode::Driving));
        assert!("flying".parse::<RouteMode>().is_err());
    }
}
