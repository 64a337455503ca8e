use crate::agentic::tools::catalog::MapTool;
use crate::agentic::tools::framework::{parse_input, DataTool, DataToolOutput, ToolUseContext};
use crate::infrastructure::geo::NominatimClient;
use crate::util::errors::{MapChatError, MapChatResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ReverseGeocodeInput {
    lat: f64,
    lng: f64,
}

pub struct ReverseGeocodeTool {
    nominatim: Arc<NominatimClient>,
}

impl ReverseGeocodeTool {
    pub fn new(nominatim: Arc<NominatimClient>) -> Self {
        Self { nominatim }
    }
}

#[async_trait]
impl DataTool for ReverseGeocodeTool {
    fn tool(&self) -> MapTool {
        MapTool::ReverseGeocode
    }

    fn failure_label(&self) -> &'static str {
        "Reverse geocode failed"
    }

    async fn call_impl(
        &self,
        input: &Map<String, Value>,
        _context: &ToolUseContext<'_>,
    ) -> MapChatResult<DataToolOutput> {
        let input: ReverseGeocodeInput = parse_input(self.tool(), input)?;
        if !(-90.0..=90.0).contains(&input.lat) || !(-180.0..=180.0).contains(&input.lng) {
            return Err(MapChatError::validation(format!(
                "lat/lng out of range: {}, {}",
                input.lat, input.lng
            )));
        }

        let hit = self.nominatim.reverse(input.lat, input.lng).await?;
        Ok(DataToolOutput::DataOnly(serde_json::to_value(hit)?))
    }
}
