//! Action execution and reply reconciliation.
//!
//! The dispatcher executes a validated [`Action`] against the store and
//! rewrites the user-facing reply to describe what actually happened. The
//! agent's own wording survives only when no action ran or the action had
//! nothing to report.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use shopassist_core::{
    OrderId, OrderNumber, OrderStatus, PaymentMethod, ProductId, UserId,
};

use crate::db::{
    NewOrder, NewOrderItem, OrderRepository, PlaceOrderError, ProductRepository, RepositoryError,
};
use crate::models::Order;

use super::{Action, PlaceOrderRequest};

/// Orders placed through the chat flow are attributed to the demo account.
const CHAT_USER_ID: UserId = UserId::new(1);

/// Attempts at allocating a unique order number before giving up.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Cash-on-delivery ceiling in dollars.
fn cod_limit() -> Decimal {
    Decimal::new(100, 0)
}

/// Whether a cash-on-delivery order of this total must be rejected.
fn cod_rejected(total: Decimal, payment_method: PaymentMethod) -> bool {
    payment_method == PaymentMethod::CashOnDelivery && total >= cod_limit()
}

/// Generate a random 8-character uppercase alphanumeric order number.
///
/// Uniqueness is enforced by the database index, not here; callers retry
/// on a collision.
#[must_use]
pub fn generate_order_number() -> OrderNumber {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    let number: String = (0..OrderNumber::LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    OrderNumber::parse(&number).expect("generated order numbers are always valid")
}

// =============================================================================
// Outcome and Debug Types
// =============================================================================

/// Result of dispatching an action.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Replacement reply describing the real outcome. `None` keeps the
    /// agent's own reply.
    pub response: Option<String>,
    /// What the store did, for the debug trace.
    pub database_query: Option<DatabaseQuery>,
}

impl DispatchOutcome {
    /// Keep the agent's reply; nothing happened.
    const fn passthrough() -> Self {
        Self {
            response: None,
            database_query: None,
        }
    }

    /// Replace the reply without a store effect.
    fn reply(text: String) -> Self {
        Self {
            response: Some(text),
            database_query: None,
        }
    }
}

/// Store effect description attached to the debug trace.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatabaseQuery {
    /// A product was looked up by name.
    ProductLookup {
        product_name: String,
        result: ProductLookupResult,
    },
    /// An order's status was read.
    OrderLookup {
        order_id: OrderId,
        result: OrderLookupResult,
    },
    /// An order was cancelled.
    OrderCancellation {
        order_number: String,
        result: CancellationResult,
    },
    /// An order was placed.
    OrderPlacement {
        order_number: String,
        result: PlacementResult,
    },
}

/// Details of a successful product lookup.
#[derive(Debug, Clone, Serialize)]
pub struct ProductLookupResult {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
}

/// Details of an order status read.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLookupResult {
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub items: Vec<OrderLookupItem>,
}

/// A line item in an order lookup.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLookupItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Details of a cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationResult {
    pub status: OrderStatus,
    pub order_id: OrderId,
}

/// Details of a placement.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementResult {
    pub order_id: OrderId,
    pub product: String,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Executes validated actions against the store.
pub struct ActionDispatcher<'a> {
    pool: &'a PgPool,
}

impl<'a> ActionDispatcher<'a> {
    /// Create a new action dispatcher.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Execute an action and produce the reconciled outcome.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only for infrastructure failures; every
    /// domain-level failure (not found, insufficient stock, COD limit)
    /// becomes a customer-facing reply.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, action: Action) -> Result<DispatchOutcome, RepositoryError> {
        match action {
            Action::LookUpProduct { product } => self.look_up_product(&product).await,
            Action::CheckOrderStatus { order_number } => {
                self.check_order_status(order_number.as_deref()).await
            }
            Action::CancelOrder { order_number } => self.cancel_order(&order_number).await,
            Action::PlaceOrder(request) => self.place_order(&request).await,
        }
    }

    /// Look up a product by name and report price, stock, and description.
    async fn look_up_product(&self, name: &str) -> Result<DispatchOutcome, RepositoryError> {
        let products = ProductRepository::new(self.pool);

        let Some(product) = products.find_by_name(name).await? else {
            // Unknown product: the agent's reply stands, as the source did.
            return Ok(DispatchOutcome::passthrough());
        };

        let mut response = format!(
            "The {name} is priced at ${price} and we have {stock} in stock.",
            name = product.name,
            price = product.price,
            stock = product.stock,
        );
        if let Some(description) = &product.description {
            response.push(' ');
            response.push_str(description);
        }

        Ok(DispatchOutcome {
            response: Some(response),
            database_query: Some(DatabaseQuery::ProductLookup {
                product_name: name.to_string(),
                result: ProductLookupResult {
                    name: product.name,
                    price: product.price,
                    stock: product.stock,
                    description: product.description,
                },
            }),
        })
    }

    /// Report the status of an order, by number if one was given, otherwise
    /// the most recent order.
    async fn check_order_status(
        &self,
        order_number: Option<&str>,
    ) -> Result<DispatchOutcome, RepositoryError> {
        let orders = OrderRepository::new(self.pool);

        let order = match order_number {
            Some(raw) => {
                let Some(order) = find_order_by_raw_number(&orders, raw).await? else {
                    return Ok(DispatchOutcome::reply(not_found_reply(raw)));
                };
                Some(order)
            }
            None => orders.latest().await?,
        };

        let Some(order) = order else {
            // No orders at all; the agent's reply stands.
            return Ok(DispatchOutcome::passthrough());
        };

        let response = match &order.order_number {
            Some(number) if order_number.is_some() => format!(
                "Your order {number} is currently {status}. The total amount is ${total}.",
                status = order.status,
                total = order.total_amount,
            ),
            _ => format!(
                "Your order is currently {status}. The total amount is ${total}.",
                status = order.status,
                total = order.total_amount,
            ),
        };

        let items = orders
            .items(order.id)
            .await?
            .into_iter()
            .map(|item| OrderLookupItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        Ok(DispatchOutcome {
            response: Some(response),
            database_query: Some(DatabaseQuery::OrderLookup {
                order_id: order.id,
                result: OrderLookupResult {
                    status: order.status,
                    total_amount: order.total_amount,
                    items,
                },
            }),
        })
    }

    /// Cancel an order by number.
    async fn cancel_order(&self, raw_number: &str) -> Result<DispatchOutcome, RepositoryError> {
        let orders = OrderRepository::new(self.pool);

        let Some(order) = find_order_by_raw_number(&orders, raw_number).await? else {
            return Ok(DispatchOutcome::reply(not_found_reply(raw_number)));
        };

        let number = order
            .order_number
            .as_ref()
            .map_or_else(|| raw_number.to_string(), ToString::to_string);

        if order.status == OrderStatus::Cancelled {
            return Ok(DispatchOutcome::reply(format!(
                "Your order {number} has already been cancelled."
            )));
        }
        if !order.status.is_cancellable() {
            return Ok(DispatchOutcome::reply(format!(
                "Your order {number} has already shipped and can no longer be cancelled. \
                 Please contact support if you need help with a return."
            )));
        }

        orders.cancel(order.id).await?;
        info!(order_id = %order.id, "order cancelled");

        Ok(DispatchOutcome {
            response: Some(format!(
                "Your order {number} has been cancelled successfully."
            )),
            database_query: Some(DatabaseQuery::OrderCancellation {
                order_number: number,
                result: CancellationResult {
                    status: OrderStatus::Cancelled,
                    order_id: order.id,
                },
            }),
        })
    }

    /// Place an order: COD limit and stock are checked, and the insert is
    /// transactional with a unique-order-number retry.
    async fn place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<DispatchOutcome, RepositoryError> {
        let products = ProductRepository::new(self.pool);
        let orders = OrderRepository::new(self.pool);

        let Some(product) = products.find_by_name(&request.product).await? else {
            return Ok(DispatchOutcome::reply(format!(
                "I couldn't find a product named {product}. \
                 Please check the product name and try again.",
                product = request.product,
            )));
        };

        let total = product.subtotal(request.quantity);

        if cod_rejected(total, request.payment_method) {
            return Ok(DispatchOutcome::reply(format!(
                "Cash on Delivery is only available for orders under $100. \
                 Your order total is ${total:.2}. Please choose a different payment method."
            )));
        }

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = generate_order_number();

            let placement = orders
                .place(
                    NewOrder {
                        user_id: CHAT_USER_ID,
                        order_number: &order_number,
                        status: OrderStatus::Pending,
                        payment_method: request.payment_method,
                        shipping_address: &request.shipping_address,
                        order_date: Utc::now(),
                    },
                    NewOrderItem {
                        product_id: product.id,
                        quantity: request.quantity,
                        price: product.price,
                    },
                )
                .await;

            match placement {
                Ok(placed) => {
                    info!(
                        order_id = %placed.order.id,
                        order_number = %order_number,
                        "order placed"
                    );
                    return Ok(placement_outcome(&placed.order, request, total, &order_number));
                }
                Err(PlaceOrderError::DuplicateOrderNumber) => {
                    warn!(attempt, "order number collision, retrying with a fresh number");
                }
                Err(PlaceOrderError::InsufficientStock { remaining }) => {
                    return Ok(DispatchOutcome::reply(format!(
                        "I'm sorry, we only have {remaining} of the {name} in stock right now, \
                         so I can't place an order for {quantity}.",
                        name = product.name,
                        quantity = request.quantity,
                    )));
                }
                Err(PlaceOrderError::Repository(e)) => return Err(e),
            }
        }

        Err(RepositoryError::Conflict(
            "could not allocate a unique order number".to_string(),
        ))
    }
}

/// Build the success outcome for a placed order.
fn placement_outcome(
    order: &Order,
    request: &PlaceOrderRequest,
    total: Decimal,
    order_number: &OrderNumber,
) -> DispatchOutcome {
    DispatchOutcome {
        response: Some(format!(
            "Your order has been placed successfully! Your order number is {order_number}. \
             Total amount: ${total:.2}. Payment method: {payment}. Shipping address: {address}.",
            payment = request.payment_method,
            address = request.shipping_address,
        )),
        database_query: Some(DatabaseQuery::OrderPlacement {
            order_number: order_number.to_string(),
            result: PlacementResult {
                order_id: order.id,
                product: request.product.clone(),
                quantity: request.quantity,
                total_amount: total,
                payment_method: request.payment_method,
                shipping_address: request.shipping_address.clone(),
            },
        }),
    }
}

/// Normalize a raw order number and look it up. Numbers that don't even
/// parse cannot exist, so they read as not found without touching the
/// database.
async fn find_order_by_raw_number(
    orders: &OrderRepository<'_>,
    raw: &str,
) -> Result<Option<Order>, RepositoryError> {
    let canonical = raw.trim().to_uppercase();
    match OrderNumber::parse(&canonical) {
        Ok(number) => orders.find_by_number(&number).await,
        Err(_) => Ok(None),
    }
}

/// The not-found reply for an order number.
fn not_found_reply(raw_number: &str) -> String {
    format!("I couldn't find an order with the number {raw_number}. Please check and try again.")
}
