//! Overpass API client for nearby point-of-interest search

use crate::util::errors::{MapChatError, MapChatResult};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_RADIUS_METERS: f64 = 1000.0;
pub const MAX_RADIUS_METERS: f64 = 5000.0;
pub const MAX_RESULTS: usize = 20;

const POI_KEYS: [&str; 4] = ["amenity", "tourism", "shop", "leisure"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceHit {
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub tags: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    tags: Map<String, Value>,
}

/// Escape a user query for use inside a double-quoted Overpass regex literal.
pub fn escape_query(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(
            c,
            '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\' | '"'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Radius in meters, defaulted when missing or non-positive and capped at the maximum.
pub fn clamp_radius(radius: Option<f64>) -> f64 {
    match radius {
        Some(r) if r.is_finite() && r > 0.0 => r.min(MAX_RADIUS_METERS),
        _ => DEFAULT_RADIUS_METERS,
    }
}

/// Overpass QL matching POI nodes around a point by name or by tag value.
pub fn build_query(query: &str, lat: f64, lng: f64, radius_meters: f64) -> String {
    let pattern = escape_query(query);
    let around = format!("(around:{},{},{})", radius_meters, lat, lng);

    let mut ql = String::from("[out:json][timeout:15];\n(\n");
    for key in POI_KEYS {
        ql.push_str(&format!(
            "  node[\"{}\"]{}[\"name\"~\"{}\",i];\n",
            key, around, pattern
        ));
    }
    for key in POI_KEYS {
        ql.push_str(&format!("  node[\"{}\"~\"{}\",i]{};\n", key, pattern, around));
    }
    ql.push_str(");\nout center body 20;");
    ql
}

pub struct OverpassClient {
    http: reqwest::Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new(http: reqwest::Client, endpoint: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
        }
    }

    pub async fn search(
        &self,
        query: &str,
        lat: f64,
        lng: f64,
        radius_meters: f64,
    ) -> MapChatResult<Vec<PlaceHit>> {
        let ql = build_query(query, lat, lng, radius_meters);
        debug!(
            "Overpass search: query={}, radius_m={}, lat={}, lng={}",
            query, radius_meters, lat, lng
        );

        let response = self
            .http
            .post(&self.endpoint)
            .form(&[("data", ql.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapChatError::Upstream {
                service: "Overpass",
                status: status.as_u16(),
            });
        }

        let body: OverpassResponse = serde_json::from_str(&response.text().await?)?;
        Ok(body
            .elements
            .into_iter()
            .take(MAX_RESULTS)
            .map(|element| PlaceHit {
                name: element
                    .tags
                    .get("name")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or("Unnamed")
                    .to_string(),
                lat: element.lat,
                lng: element.lon,
                tags: element.tags,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_regex_metacharacters_and_quotes() {
        assert_eq!(escape_query("caf\u{e9}"), "caf\u{e9}");
        assert_eq!(escape_query("a.b*c"), r"a\.b\*c");
        assert_eq!(escape_query(r#"x"];out;"#), r#"x\"\];out;"#);
        assert_eq!(escape_query(r"\d+"), r"\\d\+");
    }

    #[test]
    fn query_cannot_break_out_of_the_string_literal() {
        let ql = build_query(r#"pizza"](around:1,0,0);node["x"#, 51.5, -0.12, 500.0);
        assert!(!ql.contains(r#"pizza"]"#));
        assert!(ql.contains(r#"pizza\"\]"#));
    }

    #[test]
    fn query_covers_all_keys_by_name_and_tag() {
        let ql = build_query("museum", 48.85, 2.35, 1000.0);
        for key in POI_KEYS {
            assert!(ql.contains(&format!(
                "node[\"{}\"](around:1000,48.85,2.35)[\"name\"~\"museum\",i];",
                key
            )));
            assert!(ql.contains(&format!(
                "node[\"{}\"~\"museum\",i](around:1000,48.85,2.35);",
                key
            )));
        }
        assert!(ql.starts_with("[out:json][timeout:15];"));
        assert!(ql.ends_with("out center body 20;"));
    }

    #[test]
    fn radius_defaults_and_clamps() {
        assert_eq!(clamp_radius(None), DEFAULT_RADIUS_METERS);
        assert_eq!(clamp_radius(Some(0.0)), DEFAULT_RADIUS_METERS);
        assert_eq!(clamp_radius(Some(-5.0)), DEFAULT_RADIUS_METERS);
        assert_eq!(clamp_radius(Some(250.0)), 250.0);
        assert_eq!(clamp_radius(Some(90_000.0)), MAX_RADIUS_METERS);
    }
}
