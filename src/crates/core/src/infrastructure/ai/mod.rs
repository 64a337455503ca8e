//! Model client module
//!
//! `ChatModel` is the narrow seam the orchestration loop talks to; `GeminiChatModel` is the
//! production implementation.

pub mod gemini;
pub mod model;

pub use gemini::GeminiChatModel;
pub use model::{ChatModel, ModelReply, ToolDeclaration, ToolInvocation, ToolResponse, TranscriptEntry, TurnRequest};
