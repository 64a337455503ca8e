//! Data tool trait and result types

use super::catalog::MapTool;
use crate::agentic::execution::element_ids::ElementIdAllocator;
use crate::util::errors::{MapChatError, MapChatResult};
use async_trait::async_trait;
use log::warn;
use mapchat_core_types::ToolCall;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// What a data tool hands back to the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum DataToolOutput {
    /// Result for the model only.
    DataOnly(Value),
    /// Result for the model plus an action call to defer to the caller.
    DataWithAction(Value, ToolCall),
}

impl DataToolOutput {
    pub fn error(message: impl Into<String>) -> Self {
        DataToolOutput::DataOnly(json!({ "error": message.into() }))
    }

    pub fn result(&self) -> &Value {
        match self {
            DataToolOutput::DataOnly(value) | DataToolOutput::DataWithAction(value, _) => value,
        }
    }

    pub fn action(&self) -> Option<&ToolCall> {
        match self {
            DataToolOutput::DataOnly(_) => None,
            DataToolOutput::DataWithAction(_, call) => Some(call),
        }
    }

    pub fn is_error(&self) -> bool {
        self.result().get("error").is_some()
    }

    pub fn into_parts(self) -> (Value, Option<ToolCall>) {
        match self {
            DataToolOutput::DataOnly(value) => (value, None),
            DataToolOutput::DataWithAction(value, call) => (value, Some(call)),
        }
    }
}

/// Per-turn state shared by the tools of one batch.
pub struct ToolUseContext<'a> {
    pub ids: &'a ElementIdAllocator,
}

#[async_trait]
pub trait DataTool: Send + Sync {
    fn tool(&self) -> MapTool;

    fn name(&self) -> &'static str {
        self.tool().name()
    }

    /// Prefix for transport-level failures, e.g. "Geocode failed".
    fn failure_label(&self) -> &'static str;

    /// Time this tool needs beyond the loop's per-call timeout, if any. The loop uses the
    /// larger of the two.
    fn time_budget(&self) -> Option<Duration> {
        None
    }

    async fn call_impl(
        &self,
        input: &Map<String, Value>,
        context: &ToolUseContext<'_>,
    ) -> MapChatResult<DataToolOutput>;

    /// Never fails: every error becomes an `{error}` result the model can react to.
    async fn call(&self, input: &Map<String, Value>, context: &ToolUseContext<'_>) -> DataToolOutput {
        match self.call_impl(input, context).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Data tool failed: tool={}, error={}", self.name(), e);
                DataToolOutput::error(error_text(self.failure_label(), &e))
            }
        }
    }
}

/// Message shown to the model for a failed data tool.
pub fn error_text(label: &str, err: &MapChatError) -> String {
    match err {
        MapChatError::Upstream { .. } => err.to_string(),
        MapChatError::Tool(message) | MapChatError::Validation(message) => message.clone(),
        other => format!("{}: {}", label, other),
    }
}

/// Decode typed arguments from the untyped map the model sent.
pub fn parse_input<T: DeserializeOwned>(tool: MapTool, input: &Map<String, Value>) -> MapChatResult<T> {
    serde_json::from_value(Value::Object(input.clone())).map_err(|e| {
        MapChatError::validation(format!("Invalid arguments for {}: {}", tool.name(), e))
    })
}
