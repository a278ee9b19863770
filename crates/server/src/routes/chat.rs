//! The combined chat endpoint.
//!
//! Stateless: the caller supplies the message and the conversation history
//! and receives the reconciled reply plus a debug trace.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::agent::HistoryTurn;
use crate::error::AppError;
use crate::services::{ChatService, DebugInfo};
use crate::state::AppState;

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

/// Request body for the combined chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The customer's message.
    pub message: String,
    /// Prior turns supplied by the caller, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
}

/// Response body for the combined chat endpoint.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Reply shown to the customer.
    pub response: String,
    /// Trace of the agent call and any store effect.
    pub debug_info: DebugInfo,
}

/// Process a chat message.
///
/// POST /api/v1/chat
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let service = ChatService::new(state.pool(), state.gemini());

    let outcome = service
        .chat_once(&request.message, &request.conversation_history)
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        debug_info: outcome.debug_info,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserialization() {
        let json = r#"{
            "message": "Where is my order?",
            "conversation_history": [
                {"content": "Hi", "is_from_user": true},
                {"content": "Hello! How can I help?", "is_from_user": false}
            ]
        }"#;

        let request: ChatRequest = serde_json::from_str(json).expect("deserialize");
        assert_eq!(request.message, "Where is my order?");
        assert_eq!(request.conversation_history.len(), 2);
        assert!(request.conversation_history[0].is_from_user);
    }

    #[test]
    fn test_chat_request_history_defaults_empty() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "Hello"}"#).expect("deserialize");
        assert!(request.conversation_history.is_empty());
    }
}
