//! Gemini API client.
//!
//! Thin wrapper over the `generateContent` endpoint of the Google AI Studio
//! API. The whole prompt travels as a single user turn; the structured reply
//! is extracted from the returned text elsewhere.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GeminiConfig;

use super::error::{AgentError, ApiErrorResponse};
use super::types::{Content, GenerateRequest, GenerateResponse, GenerationConfig, Part};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Gemini API client.
///
/// Cheap to clone; the underlying HTTP client and model name are shared.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client. The API key travels as a default header
    /// on every request.
    ///
    /// # Panics
    ///
    /// Panics if the API key is not a valid header value.
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        let key_header = HeaderValue::from_str(config.api_key.expose_secret())
            .expect("API key is not a valid header value");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-goog-api-key", key_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("reqwest client construction failed");

        Self {
            inner: Arc::new(GeminiClientInner {
                client,
                model: config.model.clone(),
            }),
        }
    }

    /// Send a prompt and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, returns an error response,
    /// or produces no text.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            }),
        };

        let url = format!(
            "{GEMINI_API_BASE}/{model}:generateContent",
            model = self.inner.model
        );

        let response = self.inner.client.post(&url).json(&request).send().await?;

        let parsed = self.handle_response(response).await?;
        parsed.text().ok_or(AgentError::EmptyResponse)
    }

    /// Split a response into the parsed success body or a typed error.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<GenerateResponse, AgentError> {
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AgentError::Parse(e.to_string()))
    }

    /// Map a non-2xx status to a typed error.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> AgentError {
        use reqwest::StatusCode;

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                AgentError::RateLimited(retry_after)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AgentError::Unauthorized("API key rejected".to_string())
            }
            _ => match response.text().await {
                // The API usually explains itself with a structured error
                // body; fall back to the raw text when it doesn't.
                Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
                    Ok(api_error) => AgentError::Api {
                        status: api_error.error.status,
                        message: api_error.error.message,
                    },
                    Err(_) => AgentError::Api {
                        status: status.to_string(),
                        message: body,
                    },
                },
                Err(e) => AgentError::Http(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GeminiClient>();
    }

    #[test]
    fn test_gemini_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiClient>();
    }
}
