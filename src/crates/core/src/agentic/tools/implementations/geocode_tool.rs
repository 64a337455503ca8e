use crate::agentic::tools::catalog::MapTool;
use crate::agentic::tools::framework::{parse_input, DataTool, DataToolOutput, ToolUseContext};
use crate::infrastructure::geo::NominatimClient;
use crate::util::errors::{MapChatError, MapChatResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct GeocodeInput {
    query: String,
}

pub struct GeocodeTool {
    nominatim: Arc<NominatimClient>,
}

impl GeocodeTool {
    pub fn new(nominatim: Arc<NominatimClient>) -> Self {
        Self { nominatim }
    }
}

#[async_trait]
impl DataTool for GeocodeTool {
    fn tool(&self) -> MapTool {
        MapTool::Geocode
    }

    fn failure_label(&self) -> &'static str {
        "Geocode failed"
    }

    async fn call_impl(
        &self,
        input: &Map<String, Value>,
        _context: &ToolUseContext<'_>,
    ) -> MapChatResult<DataToolOutput> {
        let input: GeocodeInput = parse_input(self.tool(), input)?;
        let query = input.query.trim();
        if query.is_empty() {
            return Err(MapChatError::validation("query is required"));
        }

        let hits = self.nominatim.search(query).await?;
        if hits.is_empty() {
            return Ok(DataToolOutput::DataOnly(
                json!({ "results": [], "message": "No results found" }),
            ));
        }
        Ok(DataToolOutput::DataOnly(json!({ "results": hits })))
    }
}
