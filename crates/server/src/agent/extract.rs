//! JSON extraction from free-form model output.
//!
//! Models instructed to emit JSON still wrap it in prose or code fences
//! often enough that extraction has to be lenient. Three attempts, in order:
//! parse the whole text, parse the substring between the first `{` and the
//! last `}`, and finally give up and treat the raw text as a plain reply
//! with no action.

use tracing::debug;

use super::types::AgentReply;

/// Parse the model's text output into an [`AgentReply`].
///
/// Never fails: unparseable output becomes a plain reply carrying the raw
/// text, so a misbehaving model degrades to a worse answer rather than an
/// error.
#[must_use]
pub fn parse_agent_reply(text: &str) -> AgentReply {
    // First attempt: the entire output is the JSON object.
    if let Ok(reply) = serde_json::from_str::<AgentReply>(text) {
        return reply;
    }

    // Second attempt: a JSON object embedded in surrounding prose.
    if let Some(candidate) = extract_json_object(text) {
        if let Ok(reply) = serde_json::from_str::<AgentReply>(candidate) {
            return reply;
        }
    }

    debug!("model output was not structured JSON, passing text through");
    AgentReply::plain(text)
}

/// The substring from the first `{` to the last `}`, if both exist in order.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_roundtrips_unchanged() {
        let text = r#"{"response": "The Smart Watch costs $299.99.", "action_needed": "Look up product information", "action_data": {"product": "Smart Watch"}}"#;

        let reply = parse_agent_reply(text);
        assert_eq!(reply.response, "The Smart Watch costs $299.99.");
        assert_eq!(
            reply.action_needed.as_deref(),
            Some("Look up product information")
        );
        assert_eq!(reply.action_data, Some(json!({"product": "Smart Watch"})));
    }

    #[test]
    fn test_null_action_fields() {
        let text = r#"{"response": "Happy to help!", "action_needed": null, "action_data": null}"#;

        let reply = parse_agent_reply(text);
        assert_eq!(reply.response, "Happy to help!");
        assert!(reply.action_needed.is_none());
        assert!(reply.action_data.is_none());
    }

    #[test]
    fn test_prose_wrapped_json() {
        let text = "Sure! Here is the structured response:\n```json\n{\"response\": \"Done\", \"action_needed\": \"Cancel order\", \"action_data\": {\"order_number\": \"A1B2C3D4\"}}\n```\nLet me know if you need anything else.";

        let reply = parse_agent_reply(text);
        assert_eq!(reply.response, "Done");
        assert_eq!(reply.action_needed.as_deref(), Some("Cancel order"));
    }

    #[test]
    fn test_plain_prose_falls_through() {
        let text = "I'm sorry, I can't produce JSON right now.";

        let reply = parse_agent_reply(text);
        assert_eq!(reply.response, text);
        assert!(reply.action_needed.is_none());
        assert!(reply.action_data.is_none());
    }

    #[test]
    fn test_malformed_json_falls_through() {
        let text = r#"{"response": "truncated"#;

        let reply = parse_agent_reply(text);
        assert_eq!(reply.response, text);
        assert!(reply.action_needed.is_none());
    }

    #[test]
    fn test_json_missing_response_field_falls_through() {
        let text = r#"{"action_needed": "Cancel order"}"#;

        let reply = parse_agent_reply(text);
        // Without a "response" there is nothing safe to show but the raw text.
        assert_eq!(reply.response, text);
        assert!(reply.action_needed.is_none());
    }

    #[test]
    fn test_extract_json_object_bounds() {
        assert_eq!(extract_json_object("abc {\"a\": 1} def"), Some("{\"a\": 1}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }
}
