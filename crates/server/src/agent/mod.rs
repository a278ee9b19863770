//! Gemini-backed chat agent.
//!
//! The agent bridge builds a prompt from the system instructions and the
//! trailing conversation window, calls the Gemini API, and extracts the
//! structured reply from whatever text the model produced. Model output is
//! untrusted: extraction never fails, it degrades to a plain reply with no
//! action.

mod bridge;
mod client;
mod error;
mod extract;
mod prompt;
mod types;

pub use bridge::{AgentBridge, FALLBACK_REPLY};
pub use client::GeminiClient;
pub use error::AgentError;
pub use extract::parse_agent_reply;
pub use prompt::{HISTORY_WINDOW, build_prompt, render_system_prompt};
pub use types::{AgentReply, HistoryTurn};
