//! Catalog product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopassist_core::ProductId;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name (unique, used for lookups by the chat agent).
    pub name: String,
    /// Marketing description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
    /// Units currently in stock.
    pub stock: i32,
    /// Category label (e.g., "Electronics").
    pub category: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Total price for `quantity` units.
    #[must_use]
    pub fn subtotal(&self, quantity: i32) -> Decimal {
        self.price * Decimal::from(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: &str, stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Wireless Headphones".to_string(),
            description: Some("Noise-cancelling wireless headphones".to_string()),
            price: price.parse().expect("decimal"),
            stock,
            category: Some("Audio".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_subtotal() {
        let p = product("199.99", 100);
        assert_eq!(p.subtotal(2), "399.98".parse::<Decimal>().expect("decimal"));
        assert_eq!(p.subtotal(1), p.price);
    }
}
