//! Typed view of the deferred map action calls.
//!
//! The model transmits nested payloads (coordinates, properties) as serialized JSON
//! strings. `MapAction::parse` re-parses them and checks their shape so a malformed call
//! can be rejected individually instead of reaching the map store.

use crate::chat::ToolCall;
use crate::map_element::{LngLat, MapViewState};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const ADD_MAP_ELEMENT: &str = "addMapElement";
pub const UPDATE_MAP_ELEMENT: &str = "updateMapElement";
pub const REMOVE_MAP_ELEMENT: &str = "removeMapElement";
pub const SET_MAP_VIEW: &str = "setMapView";

const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionParseError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} is not valid JSON: {reason}")]
    InvalidJson { field: &'static str, reason: String },
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),
    #[error("Unknown element type: {0}")]
    UnknownElementType(String),
    #[error("Invalid coordinates for {element_type}: {reason}")]
    InvalidShape {
        element_type: ElementType,
        reason: String,
    },
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("Not a map action: {0}")]
    NotAnAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Pin,
    Area,
    Route,
    Line,
    Arc,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Pin => "pin",
            ElementType::Area => "area",
            ElementType::Route => "route",
            ElementType::Line => "line",
            ElementType::Arc => "arc",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pin" => Ok(ElementType::Pin),
            "area" => Ok(ElementType::Area),
            "route" => Ok(ElementType::Route),
            "line" => Ok(ElementType::Line),
            "arc" => Ok(ElementType::Arc),
            _ => Err(ActionParseError::UnknownElementType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementGeometry {
    Point(LngLat),
    Polygon(Vec<Vec<LngLat>>),
    Path(Vec<LngLat>),
    Arc { source: LngLat, target: LngLat },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddElementAction {
    pub element_type: ElementType,
    pub geometry: ElementGeometry,
    pub properties: Map<String, Value>,
}

impl AddElementAction {
    pub fn id(&self) -> Option<&str> {
        self.properties
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateElementAction {
    pub element_id: String,
    pub new_properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveElementAction {
    pub element_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapAction {
    Add(AddElementAction),
    Update(UpdateElementAction),
    Remove(RemoveElementAction),
    SetView(MapViewState),
}

impl MapAction {
    pub fn parse(call: &ToolCall) -> Result<Self, ActionParseError> {
        match call.name.as_str() {
            ADD_MAP_ELEMENT => parse_add(&call.args).map(MapAction::Add),
            UPDATE_MAP_ELEMENT => {
                let element_id = required_str(&call.args, "elementId")?;
                let new_properties = json_object_arg(&call.args, "newProperties")?;
                Ok(MapAction::Update(UpdateElementAction {
                    element_id,
                    new_properties,
                }))
            }
            REMOVE_MAP_ELEMENT => Ok(MapAction::Remove(RemoveElementAction {
                element_id: required_str(&call.args, "elementId")?,
            })),
            SET_MAP_VIEW => {
                let longitude = required_number(&call.args, "longitude")?;
                let latitude = required_number(&call.args, "latitude")?;
                let zoom = required_number(&call.args, "zoom")?.clamp(MIN_ZOOM, MAX_ZOOM);
                Ok(MapAction::SetView(MapViewState {
                    longitude,
                    latitude,
                    zoom,
                    pitch: None,
                    bearing: None,
                }))
            }
            other => Err(ActionParseError::NotAnAction(other.to_string())),
        }
    }
}

fn parse_add(args: &Map<String, Value>) -> Result<AddElementAction, ActionParseError> {
    let element_type: ElementType = required_str(args, "elementType")?.parse()?;
    let coordinates = json_arg(args, "coordinates")?;
    let geometry = parse_geometry(element_type, coordinates)?;
    let properties = json_object_arg(args, "properties")?;

    Ok(AddElementAction {
        element_type,
        geometry,
        properties,
    })
}

fn parse_geometry(
    element_type: ElementType,
    coordinates: Value,
) -> Result<ElementGeometry, ActionParseError> {
    let shape_error = |reason: String| ActionParseError::InvalidShape {
        element_type,
        reason,
    };

    let geometry = match element_type {
        ElementType::Pin => {
            let point: LngLat =
                serde_json::from_value(coordinates).map_err(|e| shape_error(e.to_string()))?;
            ElementGeometry::Point(point)
        }
        ElementType::Area => {
            let rings: Vec<Vec<LngLat>> =
                serde_json::from_value(coordinates).map_err(|e| shape_error(e.to_string()))?;
            if rings.is_empty() || rings.iter().any(|ring| ring.len() < 3) {
                return Err(shape_error(
                    "a polygon needs at least one ring of 3 or more points".to_string(),
                ));
            }
            ElementGeometry::Polygon(rings)
        }
        ElementType::Route | ElementType::Line => {
            let path: Vec<LngLat> =
                serde_json::from_value(coordinates).map_err(|e| shape_error(e.to_string()))?;
            if path.len() < 2 {
                return Err(shape_error("a path needs at least 2 points".to_string()));
            }
            ElementGeometry::Path(path)
        }
        ElementType::Arc => {
            #[derive(Deserialize)]
            struct Endpoints {
                source: LngLat,
                target: LngLat,
            }
            let endpoints: Endpoints =
                serde_json::from_value(coordinates).map_err(|e| shape_error(e.to_string()))?;
            ElementGeometry::Arc {
                source: endpoints.source,
                target: endpoints.target,
            }
        }
    };

    if let Some(bad) = points(&geometry).find(|p| !in_range(p)) {
        return Err(shape_error(format!(
            "[{}, {}] is not a valid [lng, lat] pair",
            bad[0], bad[1]
        )));
    }

    Ok(geometry)
}

fn points(geometry: &ElementGeometry) -> Box<dyn Iterator<Item = &LngLat> + '_> {
    match geometry {
        ElementGeometry::Point(p) => Box::new(std::iter::once(p)),
        ElementGeometry::Polygon(rings) => Box::new(rings.iter().flatten()),
        ElementGeometry::Path(path) => Box::new(path.iter()),
        ElementGeometry::Arc { source, target } => Box::new([source, target].into_iter()),
    }
}

fn in_range(p: &LngLat) -> bool {
    (-180.0..=180.0).contains(&p[0]) && (-90.0..=90.0).contains(&p[1])
}

fn required_str(args: &Map<String, Value>, key: &'static str) -> Result<String, ActionParseError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ActionParseError::MissingField(key))
}

fn required_number(args: &Map<String, Value>, key: &'static str) -> Result<f64, ActionParseError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ActionParseError::MissingField(key)),
        Some(Value::Number(n)) => n.as_f64().ok_or(ActionParseError::NotANumber(key)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ActionParseError::NotANumber(key)),
        Some(_) => Err(ActionParseError::NotANumber(key)),
    }
}

/// Nested payloads normally arrive as JSON strings; native values are accepted as-is.
fn json_arg(args: &Map<String, Value>, key: &'static str) -> Result<Value, ActionParseError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ActionParseError::MissingField(key)),
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).map_err(|e| ActionParseError::InvalidJson {
                field: key,
                reason: e.to_string(),
            })
        }
        Some(other) => Ok(other.clone()),
    }
}

fn json_object_arg(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Map<String, Value>, ActionParseError> {
    match json_arg(args, key)? {
        Value::Object(map) => Ok(map),
        _ => Err(ActionParseError::NotAnObject(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: Value) -> ToolCall {
        ToolCall::new(name, args.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn parses_pin_with_string_payloads() {
        let action = MapAction::parse(&call(
            ADD_MAP_ELEMENT,
            json!({
                "elementType": "pin",
                "coordinates": "[2.2945, 48.8584]",
                "properties": "{\"title\":\"Eiffel Tower\",\"icon\":\"🗼\"}"
            }),
        ))
        .expect("valid pin");

        let MapAction::Add(add) = action else {
            panic!("expected add action");
        };
        assert_eq!(add.element_type, ElementType::Pin);
        assert_eq!(add.geometry, ElementGeometry::Point([2.2945, 48.8584]));
        assert!(add.id().is_none());

        assert_eq!(add.properties["title"], "Eiffel Tower");
    }

    #[test]
    fn parses_arc_endpoints() {
        let action = MapAction::parse(&call(
            ADD_MAP_ELEMENT,
            json!({
                "elementType": "arc",
                "coordinates": "{\"source\":[108.9,34.3],\"target\":[28.9,41.0]}",
                "properties": "{\"title\":\"Silk Road\",\"id\":\"arc_1\"}"
            }),
        ))
        .expect("valid arc");

        let MapAction::Add(add) = action else {
            panic!("expected add action");
        };
        assert_eq!(add.id(), Some("arc_1"));
        assert_eq!(
            add.geometry,
            ElementGeometry::Arc {
                source: [108.9, 34.3],
                target: [28.9, 41.0]
            }
        );
    }

    #[test]
    fn rejects_unparsable_coordinates() {
        let err = MapAction::parse(&call(
            ADD_MAP_ELEMENT,
            json!({
                "elementType": "route",
                "coordinates": "[[0.1, 51.5], [0.2",
                "properties": "{}"
            }),
        ))
        .unwrap_err();

        assert!(matches!(
            err,
            ActionParseError::InvalidJson {
                field: "coordinates",
                ..
            }
        ));
    }

    #[test]
    fn rejects_shape_mismatch_and_out_of_range_points() {
        let err = MapAction::parse(&call(
            ADD_MAP_ELEMENT,
            json!({
                "elementType": "pin",
                "coordinates": "[[0.1, 51.5], [0.2, 51.6]]",
                "properties": "{}"
            }),
        ))
        .unwrap_err();
        assert!(matches!(err, ActionParseError::InvalidShape { .. }));

        let err = MapAction::parse(&call(
            ADD_MAP_ELEMENT,
            json!({
                "elementType": "pin",
                "coordinates": "[51.5, 191.0]",
                "properties": "{}"
            }),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("not a valid [lng, lat] pair"));
    }

    #[test]
    fn rejects_unknown_element_type() {
        let err = MapAction::parse(&call(
            ADD_MAP_ELEMENT,
            json!({
                "elementType": "hexagon",
                "coordinates": "[0, 0]",
                "properties": "{}"
            }),
        ))
        .unwrap_err();
        assert_eq!(err, ActionParseError::UnknownElementType("hexagon".to_string()));
    }

    #[test]
    fn update_requires_object_properties() {
        let err = MapAction::parse(&call(
            UPDATE_MAP_ELEMENT,
            json!({ "elementId": "pin_1", "newProperties": "[1, 2]" }),
        ))
        .unwrap_err();
        assert_eq!(err, ActionParseError::NotAnObject("newProperties"));

        let ok = MapAction::parse(&call(
            UPDATE_MAP_ELEMENT,
            json!({ "elementId": "pin_1", "newProperties": "{\"visible\": false}" }),
        ))
        .expect("valid update");
        assert!(matches!(ok, MapAction::Update(u) if u.element_id == "pin_1"));
    }

    #[test]
    fn set_view_clamps_zoom() {
        let action = MapAction::parse(&call(
            SET_MAP_VIEW,
            json!({ "longitude": -0.1276, "latitude": 51.5074, "zoom": 42 }),
        ))
        .expect("valid view");
        let MapAction::SetView(view) = action else {
            panic!("expected set view");
        };
        assert_eq!(view.zoom, 20.0);
    }

    #[test]
    fn remove_requires_element_id() {
        let err = MapAction::parse(&call(REMOVE_MAP_ELEMENT, json!({}))).unwrap_err();
        assert_eq!(err, ActionParseError::MissingField("elementId"));
    }
}
