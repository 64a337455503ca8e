//! OSRM road-routing client (per-mode profiles on routing.openstreetmap.de)

use super::{RouteMode, RouteProvider, RouteResult};
use async_trait::async_trait;
use log::{debug, warn};
use mapchat_core_types::LngLat;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<LngLat>,
}

fn profile(mode: RouteMode) -> &'static str {
    match mode {
        RouteMode::Walking => "routed-foot",
        RouteMode::Cycling => "routed-bike",
        RouteMode::Driving => "routed-car",
    }
}

pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn route_url(&self, start: LngLat, end: LngLat, mode: RouteMode) -> String {
        format!(
            "{}/{}/route/v1/{}/{},{};{},{}?geometries=geojson&overview=full",
            self.base_url,
            profile(mode),
            mode.as_str(),
            start[0],
            start[1],
            end[0],
            end[1]
        )
    }

    async fn request(&self, url: &str) -> Result<OsrmResponse, String> {
        let response = self.http.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("OSRM error: {}", status.as_u16()));
        }
        let text = response.text().await.map_err(|e| e.to_string())?;
        serde_json::from_str(&text).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl RouteProvider for OsrmClient {
    async fn fetch_route(&self, start: LngLat, end: LngLat, mode: RouteMode) -> Option<RouteResult> {
        let url = self.route_url(start, end, mode);
        debug!("OSRM request: mode={}, url={}", mode, url);

        let body = match self.request(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("OSRM route failed: mode={}, error={}", mode, e);
                return None;
            }
        };
        if body.code != "Ok" {
            debug!("OSRM returned no route: mode={}, code={}", mode, body.code);
            return None;
        }

        let route = body.routes.into_iter().next()?;
        Some(RouteResult {
            coordinates: route.geometry.coordinates,
            distance_meters: route.distance,
            duration_seconds: route.duration,
            mode,
        })
    }
}
