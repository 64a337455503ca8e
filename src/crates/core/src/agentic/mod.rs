//! Agentic layer
//!
//! Tool catalog and data tools, route mode selection and the orchestration loop.

pub mod execution;
pub mod routing;
pub mod tools;

pub use execution::{LoopConfig, LoopOutcome, MapToolLoop, StopReason};
pub use routing::resolve_route;
pub use tools::{classify_tool, DataToolSet, MapTool, ToolClass, ToolKind};
