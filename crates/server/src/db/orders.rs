//! Database operations for orders and order items.
//!
//! Order placement runs in a single transaction: the stock decrement is
//! guarded by `stock >= quantity` and the order-number unique index aborts
//! the whole transaction on a collision, so an order row can never exist
//! without its stock having been reserved.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use shopassist_core::{OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethod, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    order_number: Option<String>,
    status: String,
    total_amount: Decimal,
    payment_method: String,
    shipping_address: Option<String>,
    order_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let order_number = row
            .order_number
            .as_deref()
            .map(OrderNumber::parse)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;
        let payment_method = row
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            order_number,
            status,
            total_amount: row.total_amount,
            payment_method,
            shipping_address: row.shipping_address,
            order_date: row.order_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for order-item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, order_number, status, total_amount, payment_method, \
                             shipping_address, order_date, created_at, updated_at";

// =============================================================================
// Parameter and Result Types
// =============================================================================

/// Parameters for inserting an order row.
#[derive(Debug)]
pub struct NewOrder<'a> {
    /// Customer placing the order.
    pub user_id: UserId,
    /// Pre-generated order number.
    pub order_number: &'a OrderNumber,
    /// Initial status.
    pub status: OrderStatus,
    /// Payment method chosen at checkout.
    pub payment_method: PaymentMethod,
    /// Shipping address as free text.
    pub shipping_address: &'a str,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
}

/// Parameters for inserting an order item.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    /// Product ordered.
    pub product_id: ProductId,
    /// Units ordered. Must be positive.
    pub quantity: i32,
    /// Unit price at the time of purchase.
    pub price: Decimal,
}

impl NewOrderItem {
    fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A successfully placed order with its single line item.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// The created order row.
    pub order: Order,
    /// The created line item.
    pub item: OrderItem,
}

/// Errors specific to transactional order placement.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// Not enough stock to satisfy the requested quantity.
    #[error("insufficient stock: {remaining} remaining")]
    InsufficientStock {
        /// Units still available.
        remaining: i32,
    },

    /// The generated order number collided with an existing order.
    #[error("order number already taken")]
    DuplicateOrderNumber,

    /// Any other repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the most recently created order, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Find an order by its customer-facing order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, price FROM order_items \
             WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark an order as cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn cancel(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(OrderStatus::Cancelled.to_string())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Place an order for a single product, transactionally.
    ///
    /// Decrements stock (guarded by `stock >= quantity`), inserts the order
    /// and its line item, and commits. Nothing is written when stock is
    /// insufficient or the order number collides.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::InsufficientStock` when the guard fails,
    /// `PlaceOrderError::DuplicateOrderNumber` on an order-number collision
    /// (the caller retries with a fresh number), or a wrapped
    /// `RepositoryError` for other failures.
    pub async fn place(
        &self,
        order: NewOrder<'_>,
        item: NewOrderItem,
    ) -> Result<PlacedOrder, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            let remaining =
                sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
                    .bind(item.product_id)
                    .fetch_optional(self.pool)
                    .await?
                    .unwrap_or(0);
            return Err(PlaceOrderError::InsufficientStock { remaining });
        }

        let order_row = insert_order(&mut tx, &order, item.subtotal())
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    PlaceOrderError::DuplicateOrderNumber
                }
                _ => PlaceOrderError::Repository(RepositoryError::Database(e)),
            })?;

        let item_row = insert_item(&mut tx, order_row.id, item).await?;

        tx.commit().await?;

        Ok(PlacedOrder {
            order: order_row.try_into().map_err(PlaceOrderError::Repository)?,
            item: item_row.into(),
        })
    }

    /// Insert an order with multiple line items, computing the total from
    /// the item subtotals. Used by the seeder; does not touch stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on an order-number collision,
    /// `RepositoryError::Database` for other failures.
    pub async fn create_with_items(
        &self,
        order: NewOrder<'_>,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let total: Decimal = items.iter().map(NewOrderItem::subtotal).sum();

        let mut tx = self.pool.begin().await?;

        let order_row = insert_order(&mut tx, &order, total).await.map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("order number already exists: {}", order.order_number))
            }
            _ => RepositoryError::Database(e),
        })?;

        for item in items {
            insert_item(&mut tx, order_row.id, *item).await?;
        }

        tx.commit().await?;

        order_row.try_into()
    }
}

/// Insert an order row within a transaction.
async fn insert_order(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order: &NewOrder<'_>,
    total_amount: Decimal,
) -> Result<OrderRow, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>(&format!(
        r"
        INSERT INTO orders (user_id, order_number, status, total_amount, payment_method,
                            shipping_address, order_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(order.user_id)
    .bind(order.order_number.as_str())
    .bind(order.status.to_string())
    .bind(total_amount)
    .bind(order.payment_method.to_string())
    .bind(order.shipping_address)
    .bind(order.order_date)
    .fetch_one(&mut **tx)
    .await
}

/// Insert an order-item row within a transaction.
async fn insert_item(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: OrderId,
    item: NewOrderItem,
) -> Result<OrderItemRow, sqlx::Error> {
    sqlx::query_as::<_, OrderItemRow>(
        r"
        INSERT INTO order_items (order_id, product_id, quantity, price)
        VALUES ($1, $2, $3, $4)
        RETURNING id, order_id, product_id, quantity, price
        ",
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.price)
    .fetch_one(&mut **tx)
    .await
}
