//! Typed interpretation of agent actions.
//!
//! The agent reply's `action_needed`/`action_data` pair is model output and
//! therefore untrusted: names may be wrong, fields missing, types mangled.
//! [`interpret`] turns that blob into either a typed [`Action`] ready to
//! execute, a clarifying reply (missing or invalid required fields never
//! reach the database), or a passthrough.

mod dispatcher;

pub use dispatcher::{
    ActionDispatcher, CancellationResult, DatabaseQuery, DispatchOutcome, OrderLookupItem,
    OrderLookupResult, PlacementResult, ProductLookupResult, generate_order_number,
};

use shopassist_core::PaymentMethod;

use crate::agent::AgentReply;

/// Action names the agent is instructed to use.
pub const ACTION_LOOK_UP_PRODUCT: &str = "Look up product information";
pub const ACTION_CHECK_ORDER_STATUS: &str = "Check order status";
pub const ACTION_CANCEL_ORDER: &str = "Cancel order";
pub const ACTION_PLACE_ORDER: &str = "Place order";

/// A fully validated store action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Look up a product by name.
    LookUpProduct {
        /// Product name as given by the customer.
        product: String,
    },
    /// Report the status of an order; without a number, the most recent
    /// order is reported.
    CheckOrderStatus {
        /// Customer-facing order number, if the agent extracted one.
        order_number: Option<String>,
    },
    /// Cancel an order by number.
    CancelOrder {
        /// Customer-facing order number.
        order_number: String,
    },
    /// Place a new single-product order.
    PlaceOrder(PlaceOrderRequest),
}

/// Validated parameters for placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    /// Product name as given by the customer.
    pub product: String,
    /// Units to order, at least 1.
    pub quantity: i32,
    /// Shipping address as free text.
    pub shipping_address: String,
    /// Payment method, defaulting to credit card.
    pub payment_method: PaymentMethod,
}

/// What to do with an agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDecision {
    /// Execute a validated action against the store.
    Execute(Action),
    /// Required fields were missing or invalid; answer with a clarifying
    /// question and touch nothing.
    Clarify(String),
    /// No recognized action; the agent's own reply stands.
    Passthrough,
}

/// Interpret an untrusted agent reply into an [`ActionDecision`].
#[must_use]
pub fn interpret(reply: &AgentReply) -> ActionDecision {
    let Some(action_name) = reply.action_needed.as_deref() else {
        return ActionDecision::Passthrough;
    };

    let data = reply.action_data.as_ref();

    match action_name {
        ACTION_LOOK_UP_PRODUCT => {
            // Without a product name there is nothing to look up; the
            // agent's reply passes through untouched.
            get_str(data, "product").map_or(ActionDecision::Passthrough, |product| {
                ActionDecision::Execute(Action::LookUpProduct { product })
            })
        }
        ACTION_CHECK_ORDER_STATUS => ActionDecision::Execute(Action::CheckOrderStatus {
            order_number: get_str(data, "order_number"),
        }),
        ACTION_CANCEL_ORDER => get_str(data, "order_number").map_or_else(
            || {
                ActionDecision::Clarify(
                    "I need the order number to cancel your order. Please provide it.".to_string(),
                )
            },
            |order_number| ActionDecision::Execute(Action::CancelOrder { order_number }),
        ),
        ACTION_PLACE_ORDER => interpret_place_order(data),
        _ => ActionDecision::Passthrough,
    }
}

/// Validate the fields of a "Place order" action.
fn interpret_place_order(data: Option<&serde_json::Value>) -> ActionDecision {
    let product = get_str(data, "product");
    let shipping_address = get_str(data, "shipping_address");

    let (Some(product), Some(shipping_address)) = (product, shipping_address) else {
        return ActionDecision::Clarify(
            "I need the product name and shipping address to place your order. \
             Please provide them."
                .to_string(),
        );
    };

    let quantity = match get_quantity(data) {
        Ok(quantity) => quantity,
        Err(()) => {
            return ActionDecision::Clarify(
                "I couldn't work out how many units you'd like. \
                 Please give the quantity as a whole number."
                    .to_string(),
            );
        }
    };

    let payment_method = match get_str(data, "payment_method") {
        None => PaymentMethod::default(),
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(method) => method,
            Err(_) => {
                return ActionDecision::Clarify(format!(
                    "I can't accept \"{raw}\" as a payment method. We accept Credit Card, \
                     PayPal, Bank Transfer, and Cash on Delivery."
                ));
            }
        },
    };

    ActionDecision::Execute(Action::PlaceOrder(PlaceOrderRequest {
        product,
        quantity,
        shipping_address,
        payment_method,
    }))
}

/// Get a non-empty trimmed string field from the action data.
fn get_str(data: Option<&serde_json::Value>, key: &str) -> Option<String> {
    let value = data?.get(key)?.as_str()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Get the order quantity, defaulting to 1.
///
/// Models emit quantities as numbers or numeric strings; anything else, or
/// a non-positive value, is an error the caller turns into a clarification.
fn get_quantity(data: Option<&serde_json::Value>) -> Result<i32, ()> {
    let Some(value) = data.and_then(|d| d.get("quantity")) else {
        return Ok(1);
    };

    let quantity = match value {
        serde_json::Value::Null => return Ok(1),
        serde_json::Value::Number(n) => n.as_i64().ok_or(())?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().map_err(|_| ())?,
        _ => return Err(()),
    };

    if quantity < 1 {
        return Err(());
    }
    i32::try_from(quantity).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(action: &str, data: serde_json::Value) -> AgentReply {
        AgentReply {
            response: "Certainly!".to_string(),
            action_needed: Some(action.to_string()),
            action_data: Some(data),
        }
    }

    #[test]
    fn test_no_action_passes_through() {
        let decision = interpret(&AgentReply::plain("Hello!"));
        assert_eq!(decision, ActionDecision::Passthrough);
    }

    #[test]
    fn test_unknown_action_passes_through() {
        let decision = interpret(&reply("Process returns", json!({})));
        assert_eq!(decision, ActionDecision::Passthrough);
    }

    #[test]
    fn test_product_lookup() {
        let decision = interpret(&reply(
            ACTION_LOOK_UP_PRODUCT,
            json!({"product": "Smart Watch"}),
        ));
        assert_eq!(
            decision,
            ActionDecision::Execute(Action::LookUpProduct {
                product: "Smart Watch".to_string()
            })
        );
    }

    #[test]
    fn test_product_lookup_without_name_passes_through() {
        let decision = interpret(&reply(ACTION_LOOK_UP_PRODUCT, json!({})));
        assert_eq!(decision, ActionDecision::Passthrough);
    }

    #[test]
    fn test_order_status_with_and_without_number() {
        let decision = interpret(&reply(
            ACTION_CHECK_ORDER_STATUS,
            json!({"order_number": "A1B2C3D4"}),
        ));
        assert_eq!(
            decision,
            ActionDecision::Execute(Action::CheckOrderStatus {
                order_number: Some("A1B2C3D4".to_string())
            })
        );

        let decision = interpret(&reply(ACTION_CHECK_ORDER_STATUS, json!({})));
        assert_eq!(
            decision,
            ActionDecision::Execute(Action::CheckOrderStatus { order_number: None })
        );
    }

    #[test]
    fn test_cancel_without_number_clarifies() {
        let decision = interpret(&reply(ACTION_CANCEL_ORDER, json!({})));
        let ActionDecision::Clarify(message) = decision else {
            panic!("expected clarification");
        };
        assert!(message.contains("order number"));
    }

    #[test]
    fn test_place_order_full() {
        let decision = interpret(&reply(
            ACTION_PLACE_ORDER,
            json!({
                "product": "Coffee Maker",
                "quantity": 2,
                "shipping_address": "123 Main St, Anytown, USA",
                "payment_method": "Cash on Delivery"
            }),
        ));

        assert_eq!(
            decision,
            ActionDecision::Execute(Action::PlaceOrder(PlaceOrderRequest {
                product: "Coffee Maker".to_string(),
                quantity: 2,
                shipping_address: "123 Main St, Anytown, USA".to_string(),
                payment_method: PaymentMethod::CashOnDelivery,
            }))
        );
    }

    #[test]
    fn test_place_order_defaults() {
        let decision = interpret(&reply(
            ACTION_PLACE_ORDER,
            json!({"product": "Coffee Maker", "shipping_address": "123 Main St"}),
        ));

        let ActionDecision::Execute(Action::PlaceOrder(request)) = decision else {
            panic!("expected place order");
        };
        assert_eq!(request.quantity, 1);
        assert_eq!(request.payment_method, PaymentMethod::CreditCard);
    }

    #[test]
    fn test_place_order_missing_fields_clarifies() {
        let decision = interpret(&reply(ACTION_PLACE_ORDER, json!({"product": "Coffee Maker"})));
        let ActionDecision::Clarify(message) = decision else {
            panic!("expected clarification");
        };
        assert!(message.contains("shipping address"));
    }

    #[test]
    fn test_place_order_quantity_as_string() {
        let decision = interpret(&reply(
            ACTION_PLACE_ORDER,
            json!({"product": "Coffee Maker", "shipping_address": "123 Main St", "quantity": "3"}),
        ));

        let ActionDecision::Execute(Action::PlaceOrder(request)) = decision else {
            panic!("expected place order");
        };
        assert_eq!(request.quantity, 3);
    }

    #[test]
    fn test_place_order_bad_quantity_clarifies() {
        for bad in [json!("two"), json!(0), json!(-1), json!(1.5), json!([2])] {
            let decision = interpret(&reply(
                ACTION_PLACE_ORDER,
                json!({"product": "X", "shipping_address": "Y", "quantity": bad}),
            ));
            assert!(
                matches!(decision, ActionDecision::Clarify(_)),
                "quantity {bad} should clarify"
            );
        }
    }

    #[test]
    fn test_place_order_unknown_payment_method_clarifies() {
        let decision = interpret(&reply(
            ACTION_PLACE_ORDER,
            json!({"product": "X", "shipping_address": "Y", "payment_method": "Bitcoin"}),
        ));
        let ActionDecision::Clarify(message) = decision else {
            panic!("expected clarification");
        };
        assert!(message.contains("Bitcoin"));
        assert!(message.contains("Cash on Delivery"));
    }

    #[test]
    fn test_non_object_action_data_degrades() {
        let decision = interpret(&reply(ACTION_CANCEL_ORDER, json!("A1B2C3D4")));
        // A bare string carries no named fields, so this reads as missing.
        assert!(matches!(decision, ActionDecision::Clarify(_)));
    }
}
