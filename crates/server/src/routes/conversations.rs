//! Conversation endpoints backed by stored history.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use shopassist_core::{ConversationId, UserId};

use crate::error::AppError;
use crate::models::{Conversation, Message};
use crate::services::ChatService;
use crate::state::AppState;

/// Build the conversations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat/conversations", post(create_conversation))
        .route(
            "/chat/conversations/{id}/messages",
            post(create_message).get(list_messages),
        )
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to create a conversation.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    /// Owning user.
    pub user_id: i32,
}

/// Response for a conversation.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: i32,
    pub user_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id.as_i32(),
            user_id: conversation.user_id.as_i32(),
            created_at: conversation.created_at.to_rfc3339(),
            updated_at: conversation.updated_at.to_rfc3339(),
        }
    }
}

/// Request to send a message in a conversation.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    /// Message text.
    pub content: String,
}

/// Response for a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i32,
    pub conversation_id: i32,
    pub content: String,
    pub is_from_user: bool,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.as_i32(),
            conversation_id: message.conversation_id.as_i32(),
            content: message.content,
            is_from_user: message.is_from_user,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Create a new conversation.
///
/// POST /api/v1/chat/conversations
async fn create_conversation(
    State(state): State<AppState>,
    Json(request): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>), AppError> {
    let service = ChatService::new(state.pool(), state.gemini());

    let conversation = service
        .create_conversation(UserId::new(request.user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(conversation.into())))
}

/// Send a message in a conversation and return the agent's reply.
///
/// POST /api/v1/chat/conversations/{id}/messages
async fn create_message(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CreateMessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = ChatService::new(state.pool(), state.gemini());

    let agent_message = service
        .send_message(ConversationId::new(id), &request.content)
        .await?;

    Ok(Json(agent_message.into()))
}

/// List all messages in a conversation, oldest first.
///
/// GET /api/v1/chat/conversations/{id}/messages
async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let service = ChatService::new(state.pool(), state.gemini());

    let messages = service.list_messages(ConversationId::new(id)).await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shopassist_core::MessageId;

    #[test]
    fn test_message_response_from_model() {
        let message = Message {
            id: MessageId::new(5),
            conversation_id: ConversationId::new(2),
            content: "Your order is currently Pending.".to_string(),
            is_from_user: false,
            created_at: Utc::now(),
        };

        let response = MessageResponse::from(message);
        assert_eq!(response.id, 5);
        assert_eq!(response.conversation_id, 2);
        assert!(!response.is_from_user);
        assert!(response.created_at.contains('T'));
    }
}
