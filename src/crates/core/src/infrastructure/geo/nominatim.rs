//! Nominatim geocoding client (search and reverse)

use super::rate_limiter::RateLimiter;
use crate::util::errors::{MapChatError, MapChatResult};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const SEARCH_LIMIT: &str = "5";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeHit {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    pub place_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseHit {
    pub display_name: String,
    pub address: Value,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    address: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RawPlace {
    fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.as_deref()?.trim().parse().ok()?;
        let lng = self.lon.as_deref()?.trim().parse().ok()?;
        Some((lat, lng))
    }
}

pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client, base_url: &str, limiter: Arc<RateLimiter>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    /// Free-text search. Up to five hits; an empty list is a normal outcome.
    pub async fn search(&self, query: &str) -> MapChatResult<Vec<GeocodeHit>> {
        self.limiter.acquire().await;
        debug!("Nominatim search: query={}", query);

        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", SEARCH_LIMIT),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapChatError::Upstream {
                service: "Nominatim",
                status: status.as_u16(),
            });
        }

        let places: Vec<RawPlace> = serde_json::from_str(&response.text().await?)?;
        Ok(places
            .into_iter()
            .filter_map(|place| {
                let (lat, lng) = place.coordinates()?;
                Some(GeocodeHit {
                    lat,
                    lng,
                    display_name: place.display_name.unwrap_or_default(),
                    place_type: place.place_type,
                })
            })
            .collect())
    }

    /// Coordinates to address. A Nominatim `{error}` body surfaces as a tool error with
    /// the upstream message.
    pub async fn reverse(&self, lat: f64, lng: f64) -> MapChatResult<ReverseHit> {
        self.limiter.acquire().await;
        debug!("Nominatim reverse: lat={}, lng={}", lat, lng);

        let response = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapChatError::Upstream {
                service: "Nominatim",
                status: status.as_u16(),
            });
        }

        let place: RawPlace = serde_json::from_str(&response.text().await?)?;
        if let Some(message) = place.error {
            return Err(MapChatError::Tool(message));
        }
        let (found_lat, found_lng) = place.coordinates().unwrap_or((lat, lng));

        Ok(ReverseHit {
            display_name: place.display_name.unwrap_or_default(),
            address: place.address.unwrap_or(Value::Null),
            lat: found_lat,
            lng: found_lng,
        })
    }
}
