//! Types for the Gemini API and the structured agent reply.
//!
//! The wire types match the `generateContent` endpoint of the Google AI
//! Studio API (`generativelanguage.googleapis.com`).

use serde::{Deserialize, Serialize};

// =============================================================================
// Request Types
// =============================================================================

/// Request body for the `generateContent` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Conversation contents. This backend sends a single user turn
    /// carrying the fully assembled prompt.
    pub contents: Vec<Content>,
    /// Generation parameters.
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// The role of the turn ("user" or "model").
    pub role: String,
    /// Content parts of the turn.
    pub parts: Vec<Part>,
}

/// A text part within a turn.
#[derive(Debug, Clone, Serialize)]
pub struct Part {
    /// The text content.
    pub text: String,
}

/// Generation parameters.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    /// Maximum tokens to generate.
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from the `generateContent` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Generated candidates. Usually exactly one.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token usage information.
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any text was produced.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// A generated candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// Generated content.
    pub content: CandidateContent,
    /// Why generation stopped (e.g., "STOP", "MAX_TOKENS").
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// Content of a generated candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// A part of generated content.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    /// Text content, if this part is text.
    pub text: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageMetadata {
    /// Number of prompt tokens.
    #[serde(rename = "promptTokenCount")]
    pub prompt_token_count: Option<u32>,
    /// Number of generated tokens.
    #[serde(rename = "candidatesTokenCount")]
    pub candidates_token_count: Option<u32>,
}

// =============================================================================
// Agent Reply
// =============================================================================

/// The structured reply the model is instructed to produce.
///
/// This is UNTRUSTED input: the model may omit fields, mistype them, or not
/// produce JSON at all. Extraction (see [`crate::agent::parse_agent_reply`])
/// always yields a usable reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    /// Natural-language reply shown to the customer.
    pub response: String,
    /// Requested action name, if any.
    #[serde(default)]
    pub action_needed: Option<String>,
    /// Parameters for the requested action.
    #[serde(default)]
    pub action_data: Option<serde_json::Value>,
}

impl AgentReply {
    /// A plain reply with no action.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            action_needed: None,
            action_data: None,
        }
    }
}

/// One prior turn of the conversation, as supplied by the caller or loaded
/// from stored history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// Message text.
    pub content: String,
    /// True for customer turns, false for agent turns.
    pub is_from_user: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_response_text() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Hello"}, {"text": " world"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.text().as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_generate_response_no_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").expect("deserialize");
        assert!(response.text().is_none());
    }

    #[test]
    fn test_generate_request_serialization() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: "Hi".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: 1024,
            }),
        };

        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"maxOutputTokens\":1024"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_agent_reply_defaults() {
        let reply: AgentReply =
            serde_json::from_str(r#"{"response": "Hi there"}"#).expect("deserialize");
        assert_eq!(reply.response, "Hi there");
        assert!(reply.action_needed.is_none());
        assert!(reply.action_data.is_none());
    }
}
