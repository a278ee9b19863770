//! Order and order-item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopassist_core::{OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethod, ProductId, UserId};

/// A customer order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer who placed the order.
    pub user_id: UserId,
    /// Customer-facing order number. Nullable for rows that predate the
    /// order-number migration.
    pub order_number: Option<OrderNumber>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Order total. Equals the sum of item subtotals.
    pub total_amount: Decimal,
    /// Payment method chosen at checkout.
    pub payment_method: PaymentMethod,
    /// Shipping address as free text.
    pub shipping_address: Option<String>,
    /// When the order was placed.
    pub order_date: Option<DateTime<Utc>>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A line item within an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    /// Unique item ID.
    pub id: OrderItemId,
    /// Order this item belongs to.
    pub order_id: OrderId,
    /// Product ordered.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: i32,
    /// Unit price at the time of purchase.
    pub price: Decimal,
}

impl OrderItem {
    /// Line subtotal (unit price times quantity).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
