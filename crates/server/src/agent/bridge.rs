//! Agent bridge: prompt in, structured reply out.

use tracing::{instrument, warn};

use super::client::GeminiClient;
use super::extract::parse_agent_reply;
use super::prompt::{build_prompt, render_system_prompt};
use super::types::{AgentReply, HistoryTurn};

/// Canned reply used whenever the model cannot be reached or errors out.
pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble processing your request. \
                                  Please try again or contact human support.";

/// Bridge between the chat service and the Gemini API.
///
/// Owns the rendered system prompt and degrades every failure mode to a
/// usable [`AgentReply`]; callers never see a model error.
pub struct AgentBridge {
    client: GeminiClient,
    system_prompt: String,
}

impl AgentBridge {
    /// Create a new agent bridge.
    #[must_use]
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            system_prompt: render_system_prompt(),
        }
    }

    /// Process a customer message with its conversation context.
    ///
    /// Any client or API failure yields the canned fallback reply with no
    /// action; extraction failures degrade to a plain-text reply.
    #[instrument(skip_all)]
    pub async fn process_message(&self, message: &str, history: &[HistoryTurn]) -> AgentReply {
        let prompt = build_prompt(&self.system_prompt, history, message);

        match self.client.generate(&prompt).await {
            Ok(text) => parse_agent_reply(&text),
            Err(e) => {
                warn!(error = %e, "model call failed, using fallback reply");
                AgentReply::plain(FALLBACK_REPLY)
            }
        }
    }
}
