use super::catalog::{MapTool, ToolKind};
use super::framework::DataTool;
use super::implementations::{
    CalculateRouteTool, GeocodeTool, ReverseGeocodeTool, SearchPlacesTool,
};
use crate::infrastructure::geo::{GeoClients, RouteProvider};
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

/// Data tools by catalog entry.
#[derive(Clone, Default)]
pub struct DataToolSet {
    tools: HashMap<MapTool, Arc<dyn DataTool>>,
}

impl DataToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The production set, backed by the shared geo clients.
    pub fn from_geo(geo: &GeoClients) -> Self {
        let routes: Arc<dyn RouteProvider> = geo.osrm.clone();
        Self::new()
            .with(Arc::new(GeocodeTool::new(geo.nominatim.clone())))
            .with(Arc::new(ReverseGeocodeTool::new(geo.nominatim.clone())))
            .with(Arc::new(SearchPlacesTool::new(geo.overpass.clone())))
            .with(Arc::new(CalculateRouteTool::new(routes, geo.request_timeout)))
    }

    pub fn with(mut self, tool: Arc<dyn DataTool>) -> Self {
        let entry = tool.tool();
        if entry.kind() != ToolKind::Data {
            warn!("Ignoring data tool registered for action entry: tool={}", entry.name());
            return self;
        }
        self.tools.insert(entry, tool);
        self
    }

    pub fn get(&self, tool: MapTool) -> Option<&Arc<dyn DataTool>> {
        self.tools.get(&tool)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
