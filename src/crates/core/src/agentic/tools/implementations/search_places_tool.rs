use crate::agentic::tools::catalog::MapTool;
use crate::agentic::tools::framework::{parse_input, DataTool, DataToolOutput, ToolUseContext};
use crate::infrastructure::geo::overpass::clamp_radius;
use crate::infrastructure::geo::OverpassClient;
use crate::util::errors::{MapChatError, MapChatResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPlacesInput {
    query: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    radius_meters: Option<f64>,
}

pub struct SearchPlacesTool {
    overpass: Arc<OverpassClient>,
}

impl SearchPlacesTool {
    pub fn new(overpass: Arc<OverpassClient>) -> Self {
        Self { overpass }
    }
}

#[async_trait]
impl DataTool for SearchPlacesTool {
    fn tool(&self) -> MapTool {
        MapTool::SearchPlaces
    }

    fn failure_label(&self) -> &'static str {
        "Search failed"
    }

    async fn call_impl(
        &self,
        input: &Map<String, Value>,
        _context: &ToolUseContext<'_>,
    ) -> MapChatResult<DataToolOutput> {
        let input: SearchPlacesInput = parse_input(self.tool(), input)?;
        let query = input.query.trim();
        if query.is_empty() {
            return Err(MapChatError::validation("query, lat, and lng are required"));
        }

        let radius = clamp_radius(input.radius_meters);
        let places = self
            .overpass
            .search(query, input.lat, input.lng, radius)
            .await?;
        Ok(DataToolOutput::DataOnly(json!({ "results": places })))
    }
}
