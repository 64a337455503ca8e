//! Tool catalog and classifier
//!
//! Every tool the model may call is a [`MapTool`] variant. The variant carries its wire
//! name, its declaration and its kind, so a tool cannot be declared without being
//! classified (or the other way round).

use crate::infrastructure::ai::ToolDeclaration;
use mapchat_core_types::action::{
    ADD_MAP_ELEMENT, REMOVE_MAP_ELEMENT, SET_MAP_VIEW, UPDATE_MAP_ELEMENT,
};
use serde_json::{json, Value};

/// Where a tool call is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Resolved server-side; the real result goes back to the model.
    Data,
    /// Deferred to the caller; the model gets a stub acknowledgement.
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapTool {
    Geocode,
    ReverseGeocode,
    SearchPlaces,
    CalculateRoute,
    AddMapElement,
    UpdateMapElement,
    RemoveMapElement,
    SetMapView,
}

/// Result of classifying a tool name coming from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolClass {
    Data(MapTool),
    Action(MapTool),
    Unknown,
}

impl MapTool {
    /// Advertised order: data tools first, then action tools.
    pub const ALL: [MapTool; 8] = [
        MapTool::Geocode,
        MapTool::ReverseGeocode,
        MapTool::SearchPlaces,
        MapTool::CalculateRoute,
        MapTool::AddMapElement,
        MapTool::UpdateMapElement,
        MapTool::RemoveMapElement,
        MapTool::SetMapView,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MapTool::Geocode => "geocode",
            MapTool::ReverseGeocode => "reverseGeocode",
            MapTool::SearchPlaces => "searchPlaces",
            MapTool::CalculateRoute => "calculateRoute",
            MapTool::AddMapElement => ADD_MAP_ELEMENT,
            MapTool::UpdateMapElement => UPDATE_MAP_ELEMENT,
            MapTool::RemoveMapElement => REMOVE_MAP_ELEMENT,
            MapTool::SetMapView => SET_MAP_VIEW,
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            MapTool::Geocode
            | MapTool::ReverseGeocode
            | MapTool::SearchPlaces
            | MapTool::CalculateRoute => ToolKind::Data,
            MapTool::AddMapElement
            | MapTool::UpdateMapElement
            | MapTool::RemoveMapElement
            | MapTool::SetMapView => ToolKind::Action,
        }
    }

    pub fn from_name(name: &str) -> Option<MapTool> {
        MapTool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            MapTool::Geocode => "Look up the coordinates of a place, address, or landmark by name. Returns lat/lng and display name. ALWAYS use this instead of guessing coordinates for specific addresses or places.",
            MapTool::ReverseGeocode => "Look up the address or place name at given coordinates. Returns display name and structured address.",
            MapTool::SearchPlaces => "Search for nearby places/POIs (restaurants, museums, parks, shops, etc.) around a location. Uses OpenStreetMap data. Returns up to 20 results with names, coordinates, and tags.",
            MapTool::CalculateRoute => "Calculate a route between two points following actual roads/paths. Auto-selects the best transport mode based on distance (walking <3km, cycling 3-15km, driving >15km) unless specified. Returns distance and duration metadata. The route geometry is automatically added to the map.",
            MapTool::AddMapElement => "Add a new element to the map. Use this to create pins for locations, areas for regions, routes for paths, arcs for connections between places, or lines.",
            MapTool::UpdateMapElement => "Update properties of an existing map element by its ID. Use this to modify title, description, color, visibility, or other properties.",
            MapTool::RemoveMapElement => "Remove an element from the map by its ID.",
            MapTool::SetMapView => "Set the map view to focus on a specific location and zoom level.",
        }
    }

    fn parameters(&self) -> Value {
        match self {
            MapTool::Geocode => object_schema(
                json!({
                    "query": string_param("The place name or address to geocode (e.g. \"Science Museum, London\" or \"Eiffel Tower\")"),
                }),
                &["query"],
            ),
            MapTool::ReverseGeocode => object_schema(
                json!({
                    "lat": number_param("Latitude"),
                    "lng": number_param("Longitude"),
                }),
                &["lat", "lng"],
            ),
            MapTool::SearchPlaces => object_schema(
                json!({
                    "query": string_param("What to search for: a place type (e.g. \"restaurant\", \"museum\", \"toilet\", \"pharmacy\") or a name"),
                    "lat": number_param("Latitude of the center point to search around"),
                    "lng": number_param("Longitude of the center point to search around"),
                    "radiusMeters": number_param("Search radius in meters (default 1000, max 5000)"),
                }),
                &["query", "lat", "lng"],
            ),
            MapTool::CalculateRoute => object_schema(
                json!({
                    "startLng": number_param("Longitude of the starting point"),
                    "startLat": number_param("Latitude of the starting point"),
                    "endLng": number_param("Longitude of the destination"),
                    "endLat": number_param("Latitude of the destination"),
                    "mode": string_param("Optional transport mode: \"walking\", \"driving\", or \"cycling\". Only set if the user explicitly requests a specific mode."),
                    "properties": string_param("JSON string with route properties: { title, description, color? }"),
                }),
                &["startLng", "startLat", "endLng", "endLat"],
            ),
            MapTool::AddMapElement => object_schema(
                json!({
                    "elementType": string_param("Type of element: \"pin\", \"area\", \"route\", \"arc\", or \"line\""),
                    "coordinates": string_param("JSON string of coordinates. For pin: \"[lng, lat]\". For area: \"[[[lng,lat], ...]]\". For route/line: \"[[lng,lat], ...]\". For arc: \"{ source: [lng,lat], target: [lng,lat] }\""),
                    "properties": string_param("JSON string with element properties: { id?, title, description, color?, icon? (emoji for pins), timeRange?: { start, end? }, article?: { title, content } }"),
                }),
                &["elementType", "coordinates", "properties"],
            ),
            MapTool::UpdateMapElement => object_schema(
                json!({
                    "elementId": string_param("The ID of the element to update"),
                    "newProperties": string_param("JSON string with properties to update: { title?, description?, color?, visible?, timeRange?, article? }"),
                }),
                &["elementId", "newProperties"],
            ),
            MapTool::RemoveMapElement => object_schema(
                json!({
                    "elementId": string_param("The ID of the element to remove"),
                }),
                &["elementId"],
            ),
            MapTool::SetMapView => object_schema(
                json!({
                    "longitude": number_param("Longitude of the center point"),
                    "latitude": number_param("Latitude of the center point"),
                    "zoom": number_param("Zoom level (1-20, where 1 is world view and 20 is street level)"),
                }),
                &["longitude", "latitude", "zoom"],
            ),
        }
    }

    pub fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

fn string_param(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn number_param(description: &str) -> Value {
    json!({ "type": "NUMBER", "description": description })
}

/// The full catalog advertised on every model call.
pub fn declarations() -> Vec<ToolDeclaration> {
    MapTool::ALL.iter().map(MapTool::declaration).collect()
}

pub fn tool_names(kind: ToolKind) -> Vec<&'static str> {
    MapTool::ALL
        .iter()
        .filter(|tool| tool.kind() == kind)
        .map(MapTool::name)
        .collect()
}

pub fn classify_tool(name: &str) -> ToolClass {
    match MapTool::from_name(name) {
        Some(tool) => match tool.kind() {
            ToolKind::Data => ToolClass::Data(tool),
            ToolKind::Action => ToolClass::Action(tool),
        },
        None => ToolClass::Unknown,
    }
}
