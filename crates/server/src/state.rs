//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::agent::GeminiClient;
use crate::config::AppConfig;

/// Application state shared across all handlers.
///
/// Cheap to clone; the inner state is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    gemini: GeminiClient,
}

impl AppState {
    /// Build the application state from configuration and a database pool.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let gemini = GeminiClient::new(config.gemini());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gemini,
            }),
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// The database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The shared Gemini client.
    #[must_use]
    pub fn gemini(&self) -> &GeminiClient {
        &self.inner.gemini
    }
}
