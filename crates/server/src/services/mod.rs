//! Application services.

pub mod chat;

pub use chat::{AgentProcessing, ChatError, ChatOutcome, ChatService, DebugInfo};
