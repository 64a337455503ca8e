//! Error types shared across the core crate

use mapchat_ai_adapters::GeminiError;

pub type MapChatResult<T> = Result<T, MapChatError>;

#[derive(Debug, thiserror::Error)]
pub enum MapChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or rejected model credentials. Reported before or instead of any loop work.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("AI client error: {0}")]
    AIClient(String),

    #[error("{service} error: {status}")]
    Upstream { service: &'static str, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl MapChatError {
    pub fn tool(msg: impl Into<String>) -> Self {
        MapChatError::Tool(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        MapChatError::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        MapChatError::Config(msg.into())
    }
}

impl From<GeminiError> for MapChatError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Auth { .. } => MapChatError::Auth(err.to_string()),
            other => MapChatError::AIClient(other.to_string()),
        }
    }
}
