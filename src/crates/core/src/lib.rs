// MapChat Core Library - Platform-agnostic business logic
// Four-layer architecture: Util -> Infrastructure -> Service -> Agentic

pub mod agentic; // Agentic layer - tool catalog, data tools, route selection, orchestration loop
pub mod infrastructure; // Infrastructure layer - model client, geo HTTP clients, rate limiting
pub mod service; // Service layer - configuration, chat entry point
pub mod util; // Utility layer - errors, logging helpers

// Export main types
pub use util::errors::*;

// Export service layer components
pub use service::{
    chat::{ChatService, ModelFactory},
    config::{AgentConfig, GeoConfig, MapChatConfig, ModelConfig, ServerConfig},
};

// Export infrastructure components
pub use infrastructure::ai::{ChatModel, GeminiChatModel, ModelReply, ToolInvocation, TurnRequest};
pub use infrastructure::geo::{GeoClients, RateLimiter, RouteMode, RouteProvider, RouteResult};

// Export Agentic core types
pub use agentic::{
    execution::{LoopConfig, LoopOutcome, MapToolLoop, StopReason},
    routing::resolve_route,
    tools::{classify_tool, DataTool, DataToolOutput, DataToolSet, MapTool, ToolClass, ToolKind},
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "MapChat Core";
