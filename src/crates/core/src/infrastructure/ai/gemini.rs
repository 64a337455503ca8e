//! Gemini implementation of [`ChatModel`]

use super::model::{ChatModel, ModelReply, ToolInvocation, TranscriptEntry, TurnRequest};
use crate::util::errors::{MapChatError, MapChatResult};
use async_trait::async_trait;
use log::{debug, warn};
use mapchat_ai_adapters::types::ROLE_MODEL;
use mapchat_ai_adapters::{
    Content, FunctionDeclaration, GeminiClient, GenerateContentRequest, Part, Tool,
};
use mapchat_core_types::{ConversationMessage, MessageRole};
use std::time::Duration;

pub struct GeminiChatModel {
    client: GeminiClient,
    timeout: Duration,
}

impl GeminiChatModel {
    pub fn new(client: GeminiClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn build_request(request: &TurnRequest<'_>) -> GenerateContentRequest {
        let mut contents: Vec<Content> = request.history.iter().map(history_content).collect();
        contents.extend(request.transcript.iter().map(transcript_content));

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![Tool {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|decl| FunctionDeclaration {
                        name: decl.name.clone(),
                        description: decl.description.clone(),
                        parameters: decl.parameters.clone(),
                    })
                    .collect(),
            }]
        };

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::user_text(request.system_instruction)),
            tools,
        }
    }
}

fn history_content(message: &ConversationMessage) -> Content {
    match message.role {
        MessageRole::Assistant => Content::model_text(&message.content),
        MessageRole::User | MessageRole::System => Content::user_text(&message.content),
    }
}

fn transcript_content(entry: &TranscriptEntry) -> Content {
    match entry {
        TranscriptEntry::User(text) => Content::user_text(text),
        TranscriptEntry::Model(reply) => reply
            .provider_payload
            .as_ref()
            .and_then(|payload| serde_json::from_value::<Content>(payload.clone()).ok())
            .unwrap_or_else(|| rebuild_model_content(reply)),
        TranscriptEntry::ToolResults(results) => Content::function_responses(
            results
                .iter()
                .map(|r| Part::function_response(&r.name, r.response.clone()))
                .collect(),
        ),
    }
}

/// Replies produced outside this adapter (tests, replays) carry no payload.
fn rebuild_model_content(reply: &ModelReply) -> Content {
    let mut parts = Vec::new();
    if let Some(text) = &reply.text {
        parts.push(Part::text(text));
    }
    for call in &reply.tool_calls {
        parts.push(Part {
            function_call: Some(mapchat_ai_adapters::FunctionCall {
                name: call.name.clone(),
                args: call.args.clone(),
            }),
            ..Default::default()
        });
    }
    Content {
        role: Some(ROLE_MODEL.to_string()),
        parts,
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn name(&self) -> &str {
        self.client.model()
    }

    async fn send_turn(&self, request: TurnRequest<'_>) -> MapChatResult<ModelReply> {
        let body = Self::build_request(&request);

        let response = tokio::time::timeout(self.timeout, self.client.generate_content(&body))
            .await
            .map_err(|_| {
                MapChatError::Timeout(format!(
                    "model call exceeded {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let Some(content) = response.first_content().cloned() else {
            warn!(
                "Gemini returned no candidate content: block_reason={}",
                response.block_reason().unwrap_or("<none>")
            );
            return Ok(ModelReply::default());
        };

        let tool_calls = content
            .function_calls()
            .into_iter()
            .map(|call| ToolInvocation::new(call.name, call.args))
            .collect::<Vec<_>>();
        let text = content.text();
        debug!(
            "Gemini reply: tool_calls={}, text_len={}",
            tool_calls.len(),
            text.as_ref().map(|t| t.len()).unwrap_or(0)
        );

        Ok(ModelReply {
            text,
            tool_calls,
            provider_payload: serde_json::to_value(&content).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ai::model::{ToolDeclaration, ToolResponse};
    use serde_json::{json, Map};

    #[test]
    fn maps_history_roles_and_transcript() {
        let history = vec![
            ConversationMessage::user("Show me Rome"),
            ConversationMessage::assistant("Added the Colosseum"),
        ];
        let transcript = vec![
            TranscriptEntry::User("Now a route to the Pantheon".to_string()),
            TranscriptEntry::Model(ModelReply::tool_calls(vec![ToolInvocation::new(
                "geocode",
                json!({ "query": "Pantheon" }).as_object().cloned().unwrap_or_default(),
            )])),
            TranscriptEntry::ToolResults(vec![ToolResponse {
                name: "geocode".to_string(),
                response: json!({ "results": [] }),
            }]),
        ];
        let tools = vec![ToolDeclaration {
            name: "geocode".to_string(),
            description: "Look up a place".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        }];

        let request = GeminiChatModel::build_request(&TurnRequest {
            system_instruction: "system",
            history: &history,
            transcript: &transcript,
            tools: &tools,
        });

        let roles: Vec<_> = request
            .contents
            .iter()
            .map(|c| c.role.clone().unwrap_or_default())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user", "model", "user"]);
        assert_eq!(
            request.contents[3].parts[0]
                .function_call
                .as_ref()
                .map(|c| c.name.as_str()),
            Some("geocode")
        );
        assert_eq!(
            request.contents[4].parts[0]
                .function_response
                .as_ref()
                .map(|r| r.name.as_str()),
            Some("geocode")
        );
        assert_eq!(request.tools[0].function_declarations.len(), 1);
    }

    #[test]
    fn echoes_provider_payload_verbatim() {
        let payload = json!({
            "role": "model",
            "parts": [{
                "functionCall": { "name": "setMapView", "args": {} },
                "thoughtSignature": "sig-42"
            }]
        });
        let reply = ModelReply {
            text: None,
            tool_calls: vec![ToolInvocation::new("setMapView", Map::new())],
            provider_payload: Some(payload),
        };

        let content = transcript_content(&TranscriptEntry::Model(reply));
        assert_eq!(content.parts[0].thought_signature.as_deref(), Some("sig-42"));
    }
}
