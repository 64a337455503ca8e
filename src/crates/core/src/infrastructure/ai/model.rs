use crate::util::errors::MapChatResult;
use async_trait::async_trait;
use mapchat_core_types::ConversationMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A callable operation advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON-schema style parameter description
    pub parameters: Value,
}

/// One model-requested call. Arguments are untyped at this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
    /// Provider-specific copy of the reply, echoed back verbatim on the next round.
    pub provider_payload: Option<Value>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// The return value of one tool, correlated with its call by position and name.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub name: String,
    pub response: Value,
}

/// Entries of the live turn, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    User(String),
    Model(ModelReply),
    ToolResults(Vec<ToolResponse>),
}

pub struct TurnRequest<'a> {
    pub system_instruction: &'a str,
    /// Prior conversation, immutable.
    pub history: &'a [ConversationMessage],
    /// The live turn: the newest user message, then alternating replies and tool results.
    pub transcript: &'a [TranscriptEntry],
    pub tools: &'a [ToolDeclaration],
}

/// Function-calling model: declarations in, text and/or function calls out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;

    async fn send_turn(&self, request: TurnRequest<'_>) -> MapChatResult<ModelReply>;
}
