//! `calculateRoute`: the one data tool that also defers a map action.

use crate::agentic::routing::{resolve_route, MAX_ROUTE_ATTEMPTS};
use crate::agentic::tools::catalog::MapTool;
use crate::agentic::tools::framework::{parse_input, DataTool, DataToolOutput, ToolUseContext};
use crate::infrastructure::geo::{RouteMode, RouteProvider, RouteResult};
use crate::util::errors::{MapChatError, MapChatResult};
use async_trait::async_trait;
use log::debug;
use mapchat_core_types::action::ADD_MAP_ELEMENT;
use mapchat_core_types::ToolCall;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ROUTE_COLOR: &str = "#3b82f6";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRouteInput {
    start_lng: f64,
    start_lat: f64,
    end_lng: f64,
    end_lat: f64,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    properties: Option<Value>,
}

impl CalculateRouteInput {
    fn preferred_mode(&self) -> MapChatResult<Option<RouteMode>> {
        match self.mode.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(mode) => mode.parse().map(Some),
        }
    }

    /// Caller-supplied display overrides; unreadable input means none.
    fn overrides(&self) -> Map<String, Value> {
        match &self.properties {
            Some(Value::String(raw)) => match serde_json::from_str(raw) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}

pub struct CalculateRouteTool {
    routes: Arc<dyn RouteProvider>,
    attempt_timeout: Duration,
}

impl CalculateRouteTool {
    /// `attempt_timeout` bounds each routing request of the mode cascade.
    pub fn new(routes: Arc<dyn RouteProvider>, attempt_timeout: Duration) -> Self {
        Self {
            routes,
            attempt_timeout,
        }
    }
}

fn distance_km(route: &RouteResult) -> f64 {
    (route.distance_meters / 100.0).round() / 10.0
}

fn duration_minutes(route: &RouteResult) -> i64 {
    (route.duration_seconds / 60.0).round() as i64
}

/// Build the deferred `addMapElement` call that draws `route`.
pub fn route_element_call(
    route: &RouteResult,
    id: &str,
    overrides: &Map<String, Value>,
) -> MapChatResult<ToolCall> {
    let km = distance_km(route);
    let minutes = duration_minutes(route);
    let text = |key: &str| {
        overrides
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let properties = json!({
        "title": text("title").unwrap_or_else(|| format!("{} Route", route.mode.label())),
        "description": text("description")
            .unwrap_or_else(|| format!("{}km, ~{} min ({})", km, minutes, route.mode)),
        "color": text("color").unwrap_or_else(|| DEFAULT_ROUTE_COLOR.to_string()),
        "id": id,
    });

    let mut args = Map::new();
    args.insert("elementType".to_string(), json!("route"));
    args.insert(
        "coordinates".to_string(),
        Value::String(serde_json::to_string(&route.coordinates)?),
    );
    args.insert(
        "properties".to_string(),
        Value::String(serde_json::to_string(&properties)?),
    );
    Ok(ToolCall::new(ADD_MAP_ELEMENT, args))
}

#[async_trait]
impl DataTool for CalculateRouteTool {
    fn tool(&self) -> MapTool {
        MapTool::CalculateRoute
    }

    fn failure_label(&self) -> &'static str {
        "Route calculation failed"
    }

    fn time_budget(&self) -> Option<Duration> {
        Some(self.attempt_timeout * MAX_ROUTE_ATTEMPTS)
    }

    async fn call_impl(
        &self,
        input: &Map<String, Value>,
        context: &ToolUseContext<'_>,
    ) -> MapChatResult<DataToolOutput> {
        let input: CalculateRouteInput = parse_input(self.tool(), input)?;
        let preferred = input.preferred_mode()?;
        let start = [input.start_lng, input.start_lat];
        let end = [input.end_lng, input.end_lat];

        let Some(route) = resolve_route(
            self.routes.as_ref(),
            start,
            end,
            preferred,
            self.attempt_timeout,
        )
        .await else {
            return Err(MapChatError::tool(
                "Could not find a route between these locations",
            ));
        };

        let id = context.ids.route_id();
        debug!(
            "Route resolved: mode={}, distance_m={}, points={}, id={}",
            route.mode,
            route.distance_meters,
            route.coordinates.len(),
            id
        );
        let action = route_element_call(&route, &id, &input.overrides())?;

        Ok(DataToolOutput::DataWithAction(
            json!({
                "mode": route.mode,
                "distanceKm": distance_km(&route),
                "durationMinutes": duration_minutes(&route),
                "routeId": id,
            }),
            action,
        ))
    }
}
