//! Database operations for the `PostgreSQL` store.
//!
//! # Tables
//!
//! - `users` - Customer accounts
//! - `products` - Catalog with price and stock
//! - `orders` / `order_items` - Orders and their line items
//! - `conversations` / `messages` - Chat history
//!
//! Queries use sqlx's runtime API (`query_as` + bind); row structs are
//! converted into domain models with explicit validation.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p shopassist-cli -- migrate
//! ```

pub mod conversations;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use conversations::ConversationRepository;
pub use orders::{NewOrder, NewOrderItem, OrderRepository, PlaceOrderError, PlacedOrder};
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors produced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The query itself failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row does not convert into its domain model.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The target row does not exist.
    #[error("not found")]
    NotFound,

    /// A unique constraint fired (email, product name, order number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Open the connection pool. The URL stays wrapped in a `SecretString`
/// up to this point because it carries the database password.
///
/// # Errors
///
/// Returns `sqlx::Error` when the database is unreachable.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
