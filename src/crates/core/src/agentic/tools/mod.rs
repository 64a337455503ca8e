//! Tool system
//!
//! `catalog` declares and classifies every tool; `framework` defines the data tool
//! contract; `implementations` holds the geospatial resolvers.

pub mod catalog;
pub mod framework;
pub mod implementations;
pub mod registry;

pub use catalog::{classify_tool, declarations, tool_names, MapTool, ToolClass, ToolKind};
pub use framework::{DataTool, DataToolOutput, ToolUseContext};
pub use registry::DataToolSet;
