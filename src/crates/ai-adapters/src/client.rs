use crate::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use log::{debug, trace, warn};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// Missing, invalid or revoked credentials.
    #[error("Gemini authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },
    #[error("Gemini API error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Gemini request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gemini response could not be decoded: {0}")]
    Decode(String),
}

impl GeminiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, GeminiError::Auth { .. })
    }
}

/// Non-streaming `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        )
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = self.endpoint();
        debug!(
            "Gemini generateContent: model={}, contents={}",
            self.model,
            request.contents.len()
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        trace!("Gemini response: status={}, body={}", status, body);

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        serde_json::from_str::<GenerateContentResponse>(&body)
            .map_err(|e| GeminiError::Decode(format!("{}: {}", e, truncate_for_log(&body, 200))))
    }
}

fn classify_error(status: StatusCode, body: &str) -> GeminiError {
    let (message, api_status) = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (truncate_for_log(body, 200), None),
    };

    let auth_status = matches!(
        api_status.as_deref(),
        Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED")
    );
    // Gemini reports a bad key as 400 INVALID_ARGUMENT with this reason text.
    let invalid_key = message.contains("API key not valid");

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || auth_status
        || invalid_key
    {
        warn!("Gemini rejected credentials: status={}", status);
        GeminiError::Auth {
            status: status.as_u16(),
            message,
        }
    } else {
        GeminiError::Http {
            status: status.as_u16(),
            message,
        }
    }
}

/// Same cut as `mapchat_core::util::logging::truncate_for_log`, with a trailing ellipsis.
fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_status_maps_to_auth() {
        let body = r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#;
        let err = classify_error(StatusCode::UNAUTHORIZED, body);
        assert!(err.is_auth());
    }

    #[test]
    fn invalid_key_reported_as_bad_request_maps_to_auth() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_error(StatusCode::BAD_REQUEST, body);
        assert!(err.is_auth());
    }

    #[test]
    fn server_error_is_not_auth() {
        let err = classify_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        match err {
            GeminiError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundary() {
        assert_eq!(truncate_for_log("short", 200), "short");
        assert_eq!(truncate_for_log("aé", 2), "a...");
    }

    #[test]
    fn endpoint_encodes_model_name() {
        let client = GeminiClient::new(
            reqwest::Client::new(),
            "http://localhost:9000/v1beta/",
            "gemini-2.5-pro",
            "key",
        );
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
