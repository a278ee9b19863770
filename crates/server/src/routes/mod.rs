//! HTTP route definitions.
//!
//! API routes live under `/api/v1`; the health probes sit at the root.

pub mod chat;
pub mod conversations;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(health::router()).nest(
        "/api/v1",
        Router::new()
            .merge(chat::router())
            .merge(conversations::router()),
    )
}
