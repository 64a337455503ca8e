//! Chat service: request validation, credential resolution and one orchestration turn

use super::config::MapChatConfig;
use crate::agentic::execution::{LoopConfig, LoopOutcome, MapToolLoop};
use crate::agentic::tools::DataToolSet;
use crate::infrastructure::ai::{ChatModel, GeminiChatModel};
use crate::infrastructure::geo::{GeoClients, RateLimiter};
use crate::util::errors::{MapChatError, MapChatResult};
use log::info;
use mapchat_ai_adapters::GeminiClient;
use mapchat_core_types::ChatRequest;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds a model client for a resolved API key.
pub type ModelFactory = Arc<dyn Fn(&str) -> MapChatResult<Arc<dyn ChatModel>> + Send + Sync>;

const EMPTY_MAP_STATE: &str = "[]";

pub struct ChatService {
    config: Arc<MapChatConfig>,
    tools: DataToolSet,
    model_factory: ModelFactory,
}

impl ChatService {
    /// Production wiring: OSM-backed data tools and Gemini.
    pub fn new(config: MapChatConfig) -> MapChatResult<Self> {
        let limiter = Arc::new(RateLimiter::new(config.geo.nominatim_interval()));
        let geo = GeoClients::from_config(&config.geo, limiter)?;
        let tools = DataToolSet::from_geo(&geo);
        let model_factory = gemini_factory(&config)?;
        Ok(Self::with_parts(config, tools, model_factory))
    }

    pub fn with_parts(config: MapChatConfig, tools: DataToolSet, model_factory: ModelFactory) -> Self {
        Self {
            config: Arc::new(config),
            tools,
            model_factory,
        }
    }

    pub fn config(&self) -> &MapChatConfig {
        &self.config
    }

    pub fn has_server_key(&self) -> bool {
        self.config.model.has_api_key()
    }

    /// Run one user turn. Validation and missing credentials are reported before any model
    /// call is made.
    pub async fn handle_chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> MapChatResult<LoopOutcome> {
        let Some((latest, history)) = request.messages.split_last() else {
            return Err(MapChatError::validation("Messages are required"));
        };
        if latest.content.trim().is_empty() {
            return Err(MapChatError::validation("The latest message must not be empty"));
        }

        let api_key = self.resolve_api_key(request.api_key.as_deref())?;
        let map_state = request
            .map_state
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(EMPTY_MAP_STATE);

        info!(
            "Chat turn started: history={}, map_state_len={}, client_key={}",
            history.len(),
            map_state.len(),
            request.api_key.is_some()
        );

        let model = (self.model_factory)(&api_key)?;
        let tool_loop = MapToolLoop::new(
            model,
            self.tools.clone(),
            LoopConfig {
                max_iterations: self.config.agent.max_iterations,
                tool_timeout: self.config.agent.tool_timeout(),
            },
        );
        let outcome = tool_loop
            .run(history, &latest.content, map_state, cancel)
            .await?;

        info!(
            "Chat turn finished: stop_reason={:?}, rounds={}, actions={}, content_len={}",
            outcome.stop_reason,
            outcome.model_rounds,
            outcome.tool_calls.len(),
            outcome.content.len()
        );
        Ok(outcome)
    }

    /// Request key first, then the server key.
    fn resolve_api_key(&self, from_request: Option<&str>) -> MapChatResult<String> {
        fn usable(key: Option<&str>) -> Option<&str> {
            key.map(str::trim).filter(|k| !k.is_empty())
        }

        usable(from_request)
            .or_else(|| usable(self.config.model.api_key.as_deref()))
            .map(str::to_string)
            .ok_or_else(|| {
                MapChatError::Auth(
                    "API key is required. Please provide your Gemini API key.".to_string(),
                )
            })
    }
}

fn gemini_factory(config: &MapChatConfig) -> MapChatResult<ModelFactory> {
    let http = reqwest::Client::builder().build()?;
    let base_url = config.model.base_url.clone();
    let model = config.model.model.clone();
    let timeout = config.model.timeout();

    Ok(Arc::new(
        move |api_key: &str| -> MapChatResult<Arc<dyn ChatModel>> {
            let client =
                GeminiClient::new(http.clone(), base_url.clone(), model.clone(), api_key);
            Ok(Arc::new(GeminiChatModel::new(client, timeout)))
        },
    ))
}
