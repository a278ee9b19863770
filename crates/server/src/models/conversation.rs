//! Conversation and message models for chat history.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopassist_core::{ConversationId, MessageId, UserId};

/// A chat conversation between a customer and the agent.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    /// Unique conversation ID.
    pub id: ConversationId,
    /// Customer who owns this conversation.
    pub user_id: UserId,
    /// When the conversation was started.
    pub created_at: DateTime<Utc>,
    /// When the conversation last received a message.
    pub updated_at: DateTime<Utc>,
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Unique message ID.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// Message text.
    pub content: String,
    /// True for customer turns, false for agent turns.
    pub is_from_user: bool,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let message = Message {
            id: MessageId::new(1),
            conversation_id: ConversationId::new(2),
            content: "Hello, I need help with my order".to_string(),
            is_from_user: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&message).expect("serialize");
        assert!(json.contains("\"conversation_id\":2"));
        assert!(json.contains("\"is_from_user\":true"));
    }
}
