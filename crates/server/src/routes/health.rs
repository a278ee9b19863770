//! Liveness and readiness probes.

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Build the health router. Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(live))
        .route("/health/ready", get(ready))
}

/// GET /health
///
/// Process liveness only; touches no dependencies.
async fn live() -> &'static str {
    "ok"
}

/// GET /health/ready
///
/// Pings the database and reports 503 when it is unreachable.
async fn ready(State(state): State<AppState>) -> StatusCode {
    if sqlx::query("SELECT 1").fetch_one(state.pool()).await.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
