//! Data tool implementations

pub mod calculate_route_tool;
pub mod geocode_tool;
pub mod reverse_geocode_tool;
pub mod search_places_tool;

pub use calculate_route_tool::CalculateRouteTool;
pub use geocode_tool::GeocodeTool;
pub use reverse_geocode_tool::ReverseGeocodeTool;
pub use search_places_tool::SearchPlacesTool;
