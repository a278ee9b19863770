//! Integration tests for action interpretation.
//!
//! These run extraction and interpretation end to end over realistic model
//! outputs, without a database: every decision that would touch the store
//! is checked at the `ActionDecision` level.

use serde_json::json;

use shopassist_core::PaymentMethod;
use shopassist_server::actions::{
    ACTION_CANCEL_ORDER, ACTION_PLACE_ORDER, Action, ActionDecision, PlaceOrderRequest, interpret,
};
use shopassist_server::agent::parse_agent_reply;

/// Run the full pipeline: raw model text in, action decision out.
fn decide(text: &str) -> ActionDecision {
    interpret(&parse_agent_reply(text))
}

#[test]
fn test_cancel_order_pipeline() {
    let text = r#"{"response": "I'll cancel that for you.", "action_needed": "Cancel order", "action_data": {"order_number": "7K2M9QXZ"}}"#;

    assert_eq!(
        decide(text),
        ActionDecision::Execute(Action::CancelOrder {
            order_number: "7K2M9QXZ".to_string()
        })
    );
}

#[test]
fn test_place_order_pipeline() {
    let text = r#"{"response": "Placing your order now.", "action_needed": "Place order", "action_data": {"product": "Wireless Headphones", "quantity": 2, "shipping_address": "42 Elm St", "payment_method": "PayPal"}}"#;

    assert_eq!(
        decide(text),
        ActionDecision::Execute(Action::PlaceOrder(PlaceOrderRequest {
            product: "Wireless Headphones".to_string(),
            quantity: 2,
            shipping_address: "42 Elm St".to_string(),
            payment_method: PaymentMethod::PayPal,
        }))
    );
}

#[test]
fn test_prose_output_never_reaches_the_store() {
    let decision = decide("Let me just cancel order 7K2M9QXZ for you right away!");
    assert_eq!(decision, ActionDecision::Passthrough);
}

#[test]
fn test_fallback_reply_carries_no_action() {
    // The canned failure reply parses as a plain reply with no action.
    let decision = decide(shopassist_server::agent::FALLBACK_REPLY);
    assert_eq!(decision, ActionDecision::Passthrough);
}

#[test]
fn test_cancel_without_number_asks_for_it() {
    let reply = parse_agent_reply(
        r#"{"response": "Which order?", "action_needed": "Cancel order", "action_data": {}}"#,
    );
    let ActionDecision::Clarify(message) = interpret(&reply) else {
        panic!("expected clarification");
    };
    assert_eq!(
        message,
        "I need the order number to cancel your order. Please provide it."
    );
}

#[test]
fn test_place_order_missing_address_asks_for_it() {
    let reply = parse_agent_reply(
        r#"{"response": "Sure.", "action_needed": "Place order", "action_data": {"product": "Smart Watch"}}"#,
    );
    let ActionDecision::Clarify(message) = interpret(&reply) else {
        panic!("expected clarification");
    };
    assert!(message.contains("product name and shipping address"));
}

#[test]
fn test_whitespace_only_fields_count_as_missing() {
    let reply = parse_agent_reply(
        &serde_json::to_string(&json!({
            "response": "On it.",
            "action_needed": ACTION_CANCEL_ORDER,
            "action_data": {"order_number": "   "}
        }))
        .expect("serialize"),
    );
    assert!(matches!(interpret(&reply), ActionDecision::Clarify(_)));
}

#[test]
fn test_action_data_with_extra_fields_is_tolerated() {
    let reply = parse_agent_reply(
        &serde_json::to_string(&json!({
            "response": "Placing it.",
            "action_needed": ACTION_PLACE_ORDER,
            "action_data": {
                "product": "Coffee Maker",
                "shipping_address": "9 High St",
                "customer_mood": "impatient",
                "confidence": 0.93
            }
        }))
        .expect("serialize"),
    );

    let ActionDecision::Execute(Action::PlaceOrder(request)) = interpret(&reply) else {
        panic!("expected place order");
    };
    assert_eq!(request.product, "Coffee Maker");
    assert_eq!(request.quantity, 1);
}

#[test]
fn test_unknown_payment_method_never_defaults_silently() {
    let reply = parse_agent_reply(
        &serde_json::to_string(&json!({
            "response": "Placing it.",
            "action_needed": ACTION_PLACE_ORDER,
            "action_data": {
                "product": "Coffee Maker",
                "shipping_address": "9 High St",
                "payment_method": "store credit"
            }
        }))
        .expect("serialize"),
    );

    let ActionDecision::Clarify(message) = interpret(&reply) else {
        panic!("expected clarification");
    };
    assert!(message.contains("store credit"));
}
