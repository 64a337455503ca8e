//! Infrastructure layer
//!
//! Outbound clients: the function-calling model and the geospatial HTTP services.

pub mod ai;
pub mod geo;
