//! Chat service orchestrating the agent bridge and action dispatcher.
//!
//! This service handles the complete flow of:
//! 1. Saving the customer message (for stored conversations)
//! 2. Assembling the conversation context window
//! 3. Calling the model through the agent bridge
//! 4. Interpreting and dispatching the requested action
//! 5. Reconciling the reply with the real outcome
//! 6. Saving and returning the agent's reply

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument};

use shopassist_core::{ConversationId, UserId};

use crate::actions::{ActionDecision, ActionDispatcher, DatabaseQuery, interpret};
use crate::agent::{AgentBridge, AgentReply, GeminiClient, HistoryTurn};
use crate::db::{ConversationRepository, RepositoryError};
use crate::models::{Conversation, Message};

/// Stored turns loaded as context for a conversation-backed message.
const CONTEXT_MESSAGES: i64 = 10;

/// Errors that can occur in the chat service.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Conversation not found.
    #[error("conversation not found")]
    ConversationNotFound,
}

/// Auxiliary trace describing what the agent and the store actually did.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    /// The store effect, if an action ran.
    pub database_query: Option<DatabaseQuery>,
    /// The agent's original output and the action taken from it.
    pub agent_processing: Option<AgentProcessing>,
}

/// The agent half of the debug trace.
#[derive(Debug, Clone, Serialize)]
pub struct AgentProcessing {
    /// The structured reply as extracted from model output.
    pub original_response: AgentReply,
    /// Action name the agent requested, if any.
    pub action_taken: Option<String>,
    /// Raw action parameters from the agent.
    pub action_data: Option<serde_json::Value>,
}

/// A reconciled chat turn: the final reply plus its debug trace.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Reply shown to the customer.
    pub response: String,
    /// Debug trace returned alongside the reply.
    pub debug_info: DebugInfo,
}

/// Chat service orchestrating model calls and store actions.
pub struct ChatService<'a> {
    pool: &'a PgPool,
    gemini: &'a GeminiClient,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, gemini: &'a GeminiClient) -> Self {
        Self { pool, gemini }
    }

    /// Process a stateless chat request: the caller supplies the history.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails. Model failures never
    /// error; they degrade to the fallback reply.
    #[instrument(skip_all)]
    pub async fn chat_once(
        &self,
        message: &str,
        history: &[HistoryTurn],
    ) -> Result<ChatOutcome, ChatError> {
        self.process(message, history).await
    }

    /// Create a new conversation for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_conversation(&self, user_id: UserId) -> Result<Conversation, ChatError> {
        let repo = ConversationRepository::new(self.pool);
        Ok(repo.create(user_id).await?)
    }

    /// Get a conversation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ChatError> {
        let repo = ConversationRepository::new(self.pool);
        Ok(repo.get(conversation_id).await?)
    }

    /// Get all messages in a conversation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ChatError> {
        let repo = ConversationRepository::new(self.pool);
        Ok(repo.list_messages(conversation_id).await?)
    }

    /// Send a message in a stored conversation and return the agent's reply.
    ///
    /// The stored history (including the just-saved customer message, which
    /// the prompt window also sees) provides the context.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::ConversationNotFound` if the conversation doesn't
    /// exist, or a database error if a store operation fails.
    #[instrument(skip(self, content), fields(conversation_id = %conversation_id))]
    pub async fn send_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<Message, ChatError> {
        let repo = ConversationRepository::new(self.pool);

        if repo.get(conversation_id).await?.is_none() {
            return Err(ChatError::ConversationNotFound);
        }

        repo.add_message(conversation_id, content, true).await?;

        let history: Vec<HistoryTurn> = repo
            .recent_messages(conversation_id, CONTEXT_MESSAGES)
            .await?
            .into_iter()
            .map(|message| HistoryTurn {
                content: message.content,
                is_from_user: message.is_from_user,
            })
            .collect();

        let outcome = self.process(content, &history).await?;

        let agent_message = repo
            .add_message(conversation_id, &outcome.response, false)
            .await?;
        repo.touch(conversation_id).await?;

        Ok(agent_message)
    }

    /// Run one turn: agent bridge, action interpretation, dispatch, and
    /// reply reconciliation.
    async fn process(
        &self,
        message: &str,
        history: &[HistoryTurn],
    ) -> Result<ChatOutcome, ChatError> {
        let bridge = AgentBridge::new(self.gemini.clone());
        let agent_reply = bridge.process_message(message, history).await;

        let decision = interpret(&agent_reply);
        info!(
            action = agent_reply.action_needed.as_deref().unwrap_or("none"),
            executed = matches!(decision, ActionDecision::Execute(_)),
            "agent reply interpreted"
        );

        let (response, database_query) = match decision {
            ActionDecision::Execute(action) => {
                let dispatcher = ActionDispatcher::new(self.pool);
                let outcome = dispatcher.dispatch(action).await?;
                (
                    outcome
                        .response
                        .unwrap_or_else(|| agent_reply.response.clone()),
                    outcome.database_query,
                )
            }
            ActionDecision::Clarify(text) => (text, None),
            ActionDecision::Passthrough => (agent_reply.response.clone(), None),
        };

        let debug_info = DebugInfo {
            database_query,
            agent_processing: Some(AgentProcessing {
                action_taken: agent_reply.action_needed.clone(),
                action_data: agent_reply.action_data.clone(),
                original_response: agent_reply,
            }),
        };

        Ok(ChatOutcome {
            response,
            debug_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_info_serialization_shape() {
        let debug = DebugInfo {
            database_query: None,
            agent_processing: Some(AgentProcessing {
                original_response: AgentReply::plain("Hello!"),
                action_taken: None,
                action_data: None,
            }),
        };

        let json = serde_json::to_value(&debug).expect("serialize");
        assert!(json["database_query"].is_null());
        assert_eq!(
            json["agent_processing"]["original_response"]["response"],
            "Hello!"
        );
        assert!(json["agent_processing"]["action_taken"].is_null());
    }
}
