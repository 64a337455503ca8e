use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ROLE_USER: &str = "user";
pub const ROLE_MODEL: &str = "model";
/// Gemini accepts function responses under the `user` role.
pub const ROLE_FUNCTION: &str = "user";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Thinking models mark reasoning parts; they are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    /// Opaque signature that must be echoed back with the part it came with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Default::default()
        }
    }

    fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some(ROLE_USER.to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some(ROLE_MODEL.to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn function_responses(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ROLE_FUNCTION.to_string()),
            parts,
        }
    }

    /// Concatenated answer text, skipping thought parts. `None` when there is none.
    pub fn text(&self) -> Option<String> {
        let text = self
            .parts
            .iter()
            .filter(|part| !part.is_thought())
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| part.function_call.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Content of the first candidate, which is the only one requested.
    pub fn first_content(&self) -> Option<&Content> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_text_and_function_calls() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking about it", "thought": true },
                        { "text": "Looking up both places." },
                        {
                            "functionCall": { "name": "geocode", "args": { "query": "Big Ben" } },
                            "thoughtSignature": "sig-1"
                        },
                        { "functionCall": { "name": "geocode", "args": { "query": "Buckingham Palace" } } }
                    ]
                },
                "finishReason": "STOP"
            }]
        });

        let response: GenerateContentResponse =
            serde_json::from_value(raw).expect("valid response");
        let content = response.first_content().expect("has content");
        assert_eq!(content.text().as_deref(), Some("Looking up both places."));

        let calls = content.function_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "geocode");
        assert_eq!(calls[1].args["query"], "Buckingham Palace");
        assert_eq!(content.parts[2].thought_signature.as_deref(), Some("sig-1"));
    }

    #[test]
    fn function_call_only_response_has_no_text() {
        let content = Content {
            role: Some(ROLE_MODEL.to_string()),
            parts: vec![Part {
                function_call: Some(FunctionCall {
                    name: "setMapView".to_string(),
                    args: Map::new(),
                }),
                ..Default::default()
            }],
        };
        assert!(content.text().is_none());
    }

    #[test]
    fn request_serializes_camel_case_fields() {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text("hi")],
            system_instruction: Some(Content::user_text("be helpful")),
            tools: vec![Tool {
                function_declarations: vec![FunctionDeclaration {
                    name: "geocode".to_string(),
                    description: "Look up a place".to_string(),
                    parameters: json!({ "type": "object", "properties": {} }),
                }],
            }],
        };

        let value = serde_json::to_value(&request).expect("serializable");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be helpful");
        assert_eq!(value["tools"][0]["functionDeclarations"][0]["name"], "geocode");
        assert!(value["contents"][0]["parts"][0].get("functionCall").is_none());
    }

    #[test]
    fn reads_prompt_block_reason() {
        let raw = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let response: GenerateContentResponse =
            serde_json::from_value(raw).expect("valid response");
        assert!(response.first_content().is_none());
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }
}
