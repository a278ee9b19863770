//! Status and payment-method enums for orders.
//!
//! Both enums are stored as their display strings in the database
//! (`Pending`, `Cash on Delivery`, ...), so `Display` and `FromStr` are the
//! canonical conversions and must stay in sync with the serde renames.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether the order can still be cancelled by the customer.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment method accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "PayPal")]
    PayPal,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// All accepted payment methods.
    pub const ALL: [Self; 4] = [
        Self::CreditCard,
        Self::PayPal,
        Self::BankTransfer,
        Self::CashOnDelivery,
    ];
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreditCard => write!(f, "Credit Card"),
            Self::PayPal => write!(f, "PayPal"),
            Self::BankTransfer => write!(f, "Bank Transfer"),
            Self::CashOnDelivery => write!(f, "Cash on Delivery"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    /// Parses the display form, ignoring case. Model output is not reliable
    /// about capitalization ("cash on delivery", "Paypal").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit card" => Ok(Self::CreditCard),
            "paypal" => Ok(Self::PayPal),
            "bank transfer" => Ok(Self::BankTransfer),
            "cash on delivery" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_status_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed = OrderStatus::from_str(&status.to_string()).expect("parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_order_status_invalid() {
        assert!(OrderStatus::from_str("Refunded").is_err());
    }

    #[test]
    fn test_cancellable_statuses() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in PaymentMethod::ALL {
            let parsed = PaymentMethod::from_str(&method.to_string()).expect("parse");
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_payment_method_case_insensitive() {
        assert_eq!(
            PaymentMethod::from_str("cash on delivery").expect("parse"),
            PaymentMethod::CashOnDelivery
        );
        assert_eq!(
            PaymentMethod::from_str("PAYPAL").expect("parse"),
            PaymentMethod::PayPal
        );
    }

    #[test]
    fn test_payment_method_serde_display_form() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).expect("serialize");
        assert_eq!(json, "\"Cash on Delivery\"");
    }
}
