//! MapChat shared DTOs
//!
//! Low-level types exchanged between the HTTP surface, the orchestration core and the
//! map UI. Nothing in here performs I/O.

pub mod action;
pub mod chat;
pub mod map_element;

pub use action::{
    ActionParseError, AddElementAction, ElementGeometry, ElementType, MapAction,
    RemoveElementAction, UpdateElementAction,
};
pub use chat::{ChatRequest, ChatResponse, ConversationMessage, MessageRole, ToolCall};
pub use map_element::{
    Article, ElementBase, LngLat, MapElement, MapViewState, TimeRange,
};
