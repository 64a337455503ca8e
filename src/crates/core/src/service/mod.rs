//! Service layer
//!
//! Configuration and the chat entry point used by the HTTP surface.

pub mod chat;
pub mod config;

pub use chat::{ChatService, ModelFactory};
pub use config::{AgentConfig, GeoConfig, MapChatConfig, ModelConfig, ServerConfig};
