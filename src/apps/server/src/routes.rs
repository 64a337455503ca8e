//! Route table and handlers

use crate::error::ApiError;
use crate::examples::{load_examples, ExampleMap};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use mapchat_core::ChatService;
use mapchat_core_types::{ChatRequest, ChatResponse};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const CHAT_PATH: &str = "/api/chat";
pub const CONFIG_PATH: &str = "/api/config";
pub const EXAMPLES_PATH: &str = "/api/examples";

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub examples_dir: PathBuf,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        let examples_dir = chat.config().server.examples_dir.clone();
        Self {
            chat: Arc::new(chat),
            examples_dir,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CHAT_PATH, post(chat))
        .route(CONFIG_PATH, get(config))
        .route(EXAMPLES_PATH, get(examples))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn chat(
    State(st): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!("Rejected chat body: {}", e.body_text());
        ApiError::BadRequest("Invalid request: messages array required".to_string())
    })?;

    // Dropping the handler future (client went away) cancels the turn.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let outcome = st.chat.handle_chat(request, &cancel).await?;
    Ok(Json(outcome.into_response()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    has_server_key: bool,
}

async fn config(State(st): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        has_server_key: st.chat.has_server_key(),
    })
}

#[derive(Debug, Serialize)]
struct ExamplesResponse {
    examples: Vec<ExampleMap>,
}

async fn examples(State(st): State<AppState>) -> Result<Json<ExamplesResponse>, ApiError> {
    let examples = load_examples(&st.examples_dir).await.map_err(|e| {
        tracing::error!(
            "Failed to list examples: path={}, error={}",
            st.examples_dir.display(),
            e
        );
        ApiError::Internal("Failed to fetch examples".to_string())
    })?;
    Ok(Json(ExamplesResponse { examples }))
}
