use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mapchat_core::MapChatError;

/// Fixed body for anything the caller cannot act on.
pub const INTERNAL_CHAT_ERROR: &str = "Failed to process chat request";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (code, body).into_response()
    }
}

impl From<MapChatError> for ApiError {
    fn from(e: MapChatError) -> Self {
        match e {
            MapChatError::Validation(msg) => ApiError::BadRequest(msg),
            MapChatError::Auth(msg) => ApiError::Unauthorized(msg),
            other => {
                tracing::error!("Chat request failed: {}", other);
                ApiError::Internal(INTERNAL_CHAT_ERROR.to_string())
            }
        }
    }
}
