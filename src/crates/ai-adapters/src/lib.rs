//! Gemini `generateContent` protocol adapter
//!
//! Wire types for the function-calling flavour of the API plus a thin `reqwest` client.
//! Conversation bookkeeping lives in `mapchat-core`; this crate only speaks the protocol.

pub mod client;
pub mod types;

pub use client::{GeminiClient, GeminiError};
pub use types::{
    Candidate, Content, FunctionCall, FunctionDeclaration, FunctionResponse,
    GenerateContentRequest, GenerateContentResponse, Part, Tool,
};
