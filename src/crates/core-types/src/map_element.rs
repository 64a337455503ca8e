use serde::{Deserialize, Serialize};

/// `[longitude, latitude]`
pub type LngLat = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// ISO date string
    pub start: String,
    /// Open-ended when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

fn default_visible() -> bool {
    true
}

/// Fields shared by every element variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<Article>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

/// A geographic feature on the map, tagged by `type` the way the UI stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MapElement {
    Pin {
        #[serde(flatten)]
        base: ElementBase,
        coordinates: LngLat,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
    Area {
        #[serde(flatten)]
        base: ElementBase,
        coordinates: Vec<Vec<LngLat>>,
    },
    /// Dashed path
    Route {
        #[serde(flatten)]
        base: ElementBase,
        coordinates: Vec<LngLat>,
    },
    /// Solid path
    Line {
        #[serde(flatten)]
        base: ElementBase,
        coordinates: Vec<LngLat>,
    },
    /// Great-circle arc between two points
    Arc {
        #[serde(flatten)]
        base: ElementBase,
        source: LngLat,
        target: LngLat,
    },
}

impl MapElement {
    pub fn base(&self) -> &ElementBase {
        match self {
            MapElement::Pin { base, .. }
            | MapElement::Area { base, .. }
            | MapElement::Route { base, .. }
            | MapElement::Line { base, .. }
            | MapElement::Arc { base, .. } => base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
}
