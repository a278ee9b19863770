//! Prompt assembly for the chat agent.
//!
//! The prompt is: system instructions, the customer message, the trailing
//! window of prior turns, and an explicit JSON-format instruction block
//! appended last.

use askama::Template;

use super::types::HistoryTurn;

/// Number of prior turns included as context.
pub const HISTORY_WINDOW: usize = 5;

/// JSON-format instructions appended to every prompt.
const JSON_INSTRUCTIONS: &str = r#"IMPORTANT: You MUST respond in valid JSON format with the following structure:
{
    "response": "Your response to the customer",
    "action_needed": "action_type or null",
    "action_data": {} or null
}

Do not include any text outside of the JSON structure."#;

/// System prompt template for the chat agent.
#[derive(Template)]
#[template(path = "agent/system_prompt.txt")]
struct SystemPromptTemplate;

/// Render the system prompt template.
#[must_use]
pub fn render_system_prompt() -> String {
    // Static template with no variables; rendering cannot realistically fail.
    SystemPromptTemplate
        .render()
        .unwrap_or_else(|_| String::from("You are a helpful e-commerce customer service agent."))
}

/// Format the trailing history window as labelled turns.
fn format_history(history: &[HistoryTurn]) -> String {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .map(|turn| {
            let speaker = if turn.is_from_user { "Customer" } else { "Agent" };
            format!("{speaker}: {content}", content = turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full prompt sent to the model.
#[must_use]
pub fn build_prompt(system_prompt: &str, history: &[HistoryTurn], message: &str) -> String {
    let base = format!("{system_prompt}\n\nCustomer message: {message}");

    if history.is_empty() {
        format!("{base}\n{JSON_INSTRUCTIONS}")
    } else {
        format!(
            "{base}\n\nCurrent conversation context:\n{history}\n{JSON_INSTRUCTIONS}",
            history = format_history(history)
        )
    }
}
