//! Orchestration loop
//!
//! One iteration is one model round-trip. Tool calls returned by a single reply run
//! concurrently, and their results go back to the model in call order. Action calls are
//! accumulated across iterations in emission order and returned to the caller.

use super::element_ids::ElementIdAllocator;
use super::prompts::build_system_instruction;
use crate::agentic::tools::{
    classify_tool, declarations, DataToolSet, MapTool, ToolClass, ToolUseContext,
};
use crate::infrastructure::ai::{
    ChatModel, ModelReply, ToolDeclaration, ToolInvocation, ToolResponse, TranscriptEntry,
    TurnRequest,
};
use crate::util::errors::{MapChatError, MapChatResult};
use crate::util::logging::truncate_for_log;
use futures::future::join_all;
use log::{debug, warn};
use mapchat_core_types::action::ADD_MAP_ELEMENT;
use mapchat_core_types::{
    ChatResponse, ConversationMessage, MapAction, RemoveElementAction, ToolCall,
    UpdateElementAction,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ARGS_LOG_LIMIT: usize = 200;
const RESULT_LOG_LIMIT: usize = 300;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum model round-trips per turn.
    pub max_iterations: usize,
    /// Upper bound for a single data tool call.
    pub tool_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tool_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model answered without requesting tools.
    Completed,
    /// The iteration ceiling was reached with tool calls still being requested.
    MaxIterations,
    /// A non-auth model failure ended the turn early.
    ModelError,
    /// The caller abandoned the request.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    pub model_rounds: usize,
}

impl LoopOutcome {
    pub fn into_response(self) -> ChatResponse {
        ChatResponse {
            content: self.content,
            tool_calls: self.tool_calls,
        }
    }
}

enum LoopState {
    AwaitingModel,
    DispatchingTools(ModelReply),
    Done(StopReason),
}

/// One resolved tool call: what the model sees and what the caller may receive.
struct Dispatched {
    response: Value,
    action: Option<ToolCall>,
}

impl Dispatched {
    fn error(message: impl Into<String>) -> Self {
        Self {
            response: json!({ "error": message.into() }),
            action: None,
        }
    }
}

pub struct MapToolLoop {
    model: Arc<dyn ChatModel>,
    tools: DataToolSet,
    declarations: Vec<ToolDeclaration>,
    config: LoopConfig,
}

impl MapToolLoop {
    pub fn new(model: Arc<dyn ChatModel>, tools: DataToolSet, config: LoopConfig) -> Self {
        Self {
            model,
            tools,
            declarations: declarations(),
            config,
        }
    }

    /// Run one chat turn. `history` excludes `user_message`.
    ///
    /// Returns `Err` only for authentication failures; every other problem ends the turn
    /// with a partial outcome.
    pub async fn run(
        &self,
        history: &[ConversationMessage],
        user_message: &str,
        map_state: &str,
        cancel: &CancellationToken,
    ) -> MapChatResult<LoopOutcome> {
        let system_instruction = build_system_instruction(map_state);
        let ids = ElementIdAllocator::from_snapshot(map_state);

        let mut transcript = vec![TranscriptEntry::User(user_message.to_string())];
        let mut content = String::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();
        let mut model_rounds = 0usize;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if cancel.is_cancelled() {
                        LoopState::Done(StopReason::Cancelled)
                    } else if model_rounds >= self.config.max_iterations {
                        warn!(
                            "Iteration limit reached: max_iterations={}, actions={}",
                            self.config.max_iterations,
                            tool_calls.len()
                        );
                        LoopState::Done(StopReason::MaxIterations)
                    } else {
                        model_rounds += 1;
                        debug!(
                            "Model round: iteration={}, model={}, transcript_len={}",
                            model_rounds,
                            self.model.name(),
                            transcript.len()
                        );

                        let request = TurnRequest {
                            system_instruction: &system_instruction,
                            history,
                            transcript: &transcript,
                            tools: &self.declarations,
                        };
                        let reply = tokio::select! {
                            _ = cancel.cancelled() => None,
                            reply = self.model.send_turn(request) => Some(reply),
                        };

                        match reply {
                            None => LoopState::Done(StopReason::Cancelled),
                            Some(Err(e @ MapChatError::Auth(_))) => return Err(e),
                            Some(Err(e)) => {
                                warn!(
                                    "Model call failed, ending turn: iteration={}, error={}",
                                    model_rounds, e
                                );
                                LoopState::Done(StopReason::ModelError)
                            }
                            Some(Ok(reply)) => {
                                if let Some(text) =
                                    reply.text.as_deref().filter(|t| !t.trim().is_empty())
                                {
                                    content = text.to_string();
                                }
                                if reply.has_tool_calls() {
                                    LoopState::DispatchingTools(reply)
                                } else {
                                    LoopState::Done(StopReason::Completed)
                                }
                            }
                        }
                    }
                }
                LoopState::DispatchingTools(reply) => {
                    let batch = tokio::select! {
                        _ = cancel.cancelled() => None,
                        batch = self.dispatch_batch(&reply.tool_calls, &ids) => Some(batch),
                    };
                    match batch {
                        None => LoopState::Done(StopReason::Cancelled),
                        Some(batch) => {
                            let mut responses = Vec::with_capacity(batch.len());
                            for (call, dispatched) in reply.tool_calls.iter().zip(batch) {
                                if let Some(action) = dispatched.action {
                                    tool_calls.push(action);
                                }
                                responses.push(ToolResponse {
                                    name: call.name.clone(),
                                    response: dispatched.response,
                                });
                            }
                            transcript.push(TranscriptEntry::Model(reply));
                            transcript.push(TranscriptEntry::ToolResults(responses));
                            LoopState::AwaitingModel
                        }
                    }
                }
                LoopState::Done(stop_reason) => {
                    debug!(
                        "Turn finished: stop_reason={:?}, rounds={}, actions={}, content_len={}",
                        stop_reason,
                        model_rounds,
                        tool_calls.len(),
                        content.len()
                    );
                    return Ok(LoopOutcome {
                        content,
                        tool_calls,
                        stop_reason,
                        model_rounds,
                    });
                }
            };
        }
    }

    async fn dispatch_batch(
        &self,
        calls: &[ToolInvocation],
        ids: &ElementIdAllocator,
    ) -> Vec<Dispatched> {
        join_all(calls.iter().map(|call| self.dispatch(call, ids))).await
    }

    async fn dispatch(&self, call: &ToolInvocation, ids: &ElementIdAllocator) -> Dispatched {
        debug!(
            "Tool call: name={}, args={}",
            call.name,
            truncate_for_log(&Value::Object(call.args.clone()).to_string(), ARGS_LOG_LIMIT)
        );

        let dispatched = match classify_tool(&call.name) {
            ToolClass::Data(tool) => self.run_data_tool(tool, &call.args, ids).await,
            ToolClass::Action(_) => accept_action(call, ids),
            ToolClass::Unknown => {
                warn!("Unknown tool requested: name={}", call.name);
                Dispatched::error(format!("Unknown tool: {}", call.name))
            }
        };

        debug!(
            "Tool result: name={}, deferred_action={}, result={}",
            call.name,
            dispatched.action.is_some(),
            truncate_for_log(&dispatched.response.to_string(), RESULT_LOG_LIMIT)
        );
        dispatched
    }

    async fn run_data_tool(
        &self,
        tool: MapTool,
        args: &Map<String, Value>,
        ids: &ElementIdAllocator,
    ) -> Dispatched {
        let Some(handler) = self.tools.get(tool) else {
            warn!("Data tool not registered: name={}", tool.name());
            return Dispatched::error(format!("Tool not available: {}", tool.name()));
        };

        let context = ToolUseContext { ids };
        let budget = handler
            .time_budget()
            .map_or(self.config.tool_timeout, |b| b.max(self.config.tool_timeout));
        match tokio::time::timeout(budget, handler.call(args, &context)).await {
            Ok(output) => {
                let (response, action) = output.into_parts();
                Dispatched { response, action }
            }
            Err(_) => {
                warn!(
                    "Data tool timed out: name={}, timeout_secs={}",
                    tool.name(),
                    budget.as_secs()
                );
                Dispatched::error(format!(
                    "{} timed out after {}s",
                    tool.name(),
                    budget.as_secs()
                ))
            }
        }
    }
}

/// Validate an action call and queue it for the caller. Add calls get a session-unique id,
/// and later updates or removals of a reallocated id follow it to the new one.
fn accept_action(call: &ToolInvocation, ids: &ElementIdAllocator) -> Dispatched {
    let wire = ToolCall::new(call.name.clone(), call.args.clone());
    let action = match MapAction::parse(&wire) {
        Ok(action) => action,
        Err(e) => {
            warn!("Rejected action call: name={}, error={}", call.name, e);
            return Dispatched::error(e.to_string());
        }
    };

    match action {
        MapAction::Add(add) => {
            let id = ids.claim(add.id(), add.element_type);
            match normalized_add_call(&wire, add.properties, &id) {
                Ok(normalized) => Dispatched {
                    response: json!({ "success": true, "id": id }),
                    action: Some(normalized),
                },
                Err(e) => Dispatched::error(e.to_string()),
            }
        }
        MapAction::Update(UpdateElementAction { element_id, .. })
        | MapAction::Remove(RemoveElementAction { element_id }) => {
            let mut wire = wire;
            if let Some(id) = ids.renamed(&element_id) {
                debug!(
                    "Retargeting action to reallocated id: name={}, proposed={}, id={}",
                    call.name, element_id, id
                );
                wire.args.insert("elementId".to_string(), Value::String(id));
            }
            Dispatched {
                response: json!({ "success": true }),
                action: Some(wire),
            }
        }
        MapAction::SetView(_) => Dispatched {
            response: json!({ "success": true }),
            action: Some(wire),
        },
    }
}

/// Re-emit an add call with JSON-string payloads and the allocated id.
fn normalized_add_call(
    original: &ToolCall,
    mut properties: Map<String, Value>,
    id: &str,
) -> MapChatResult<ToolCall> {
    properties.insert("id".to_string(), Value::String(id.to_string()));

    let mut args = original.args.clone();
    if let Some(coordinates) = args.get_mut("coordinates") {
        if !coordinates.is_string() {
            *coordinates = Value::String(serde_json::to_string(coordinates)?);
        }
    }
    args.insert(
        "properties".to_string(),
        Value::String(serde_json::to_string(&properties)?),
    );
    Ok(ToolCall::new(ADD_MAP_ELEMENT, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(name: &str, args: Value) -> ToolInvocation {
        ToolInvocation::new(name, args.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn add_call_gets_fresh_id_when_colliding() {
        let ids = ElementIdAllocator::from_snapshot(r#"[{"id":"pin_1"}]"#);
        let dispatched = accept_action(
            &invocation(
                "addMapElement",
                json!({
                    "elementType": "pin",
                    "coordinates": "[12.4922, 41.8902]",
                    "properties": "{\"title\":\"Colosseum\",\"id\":\"pin_1\"}"
                }),
            ),
            &ids,
        );

        assert_eq!(dispatched.response, json!({ "success": true, "id": "pin_2" }));
        let action = dispatched.action.expect("accepted");
        let properties: Value =
            serde_json::from_str(action.arg_str("properties").unwrap_or("{}")).unwrap();
        assert_eq!(properties["id"], "pin_2");
        assert_eq!(properties["title"], "Colosseum");
        assert_eq!(action.arg_str("coordinates"), Some("[12.4922, 41.8902]"));
    }

    #[test]
    fn native_coordinates_are_serialized() {
        let ids = ElementIdAllocator::default();
        let dispatched = accept_action(
            &invocation(
                "addMapElement",
                json!({
                    "elementType": "line",
                    "coordinates": [[0.0, 0.0], [1.0, 1.0]],
                    "properties": { "title": "Border" }
                }),
            ),
            &ids,
        );
        let action = dispatched.action.expect("accepted");
        assert_eq!(action.arg_str("coordinates"), Some("[[0.0,0.0],[1.0,1.0]]"));
        assert!(action.arg_str("properties").is_some());
    }

    #[test]
    fn malformed_action_is_rejected_individually() {
        let ids = ElementIdAllocator::default();
        let dispatched = accept_action(
            &invocation(
                "addMapElement",
                json!({ "elementType": "pin", "coordinates": "[1,", "properties": "{}" }),
            ),
            &ids,
        );
        assert!(dispatched.action.is_none());
        assert!(dispatched.response["error"]
            .as_str()
            .map(|e| e.contains("coordinates"))
            .unwrap_or(false));
    }

    #[test]
    fn update_of_reallocated_id_follows_the_new_element() {
        let ids = ElementIdAllocator::from_snapshot(r#"[{"id":"pin_1"}]"#);
        accept_action(
            &invocation(
                "addMapElement",
                json!({
                    "elementType": "pin",
                    "coordinates": "[12.4768, 41.8986]",
                    "properties": "{\"title\":\"Pantheon\",\"id\":\"pin_1\"}"
                }),
            ),
            &ids,
        );

        let dispatched = accept_action(
            &invocation(
                "updateMapElement",
                json!({ "elementId": "pin_1", "newProperties": "{\"color\":\"#ff0000\"}" }),
            ),
            &ids,
        );
        let action = dispatched.action.expect("accepted");
        assert_eq!(action.arg_str("elementId"), Some("pin_2"));
        assert_eq!(action.arg_str("newProperties"), Some("{\"color\":\"#ff0000\"}"));
    }

    #[test]
    fn non_add_actions_pass_through_verbatim() {
        let ids = ElementIdAllocator::default();
        let call = invocation("removeMapElement", json!({ "elementId": "pin_9" }));
        let dispatched = accept_action(&call, &ids);
        let action = dispatched.action.expect("accepted");
        assert_eq!(action.name, "removeMapElement");
        assert_eq!(action.args, call.args);
    }
}
