//! Shared helpers for ShopAssist integration tests.
//!
//! Most tests in this crate exercise the library surface without any
//! external service. Database-backed tests are `#[ignore]`d and need a
//! local `PostgreSQL` instance; point `SHOPASSIST_TEST_DATABASE_URL` (or
//! `DATABASE_URL`) at a scratch database and run:
//!
//! ```bash
//! cargo test -p shopassist-integration-tests -- --ignored
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use secrecy::SecretString;
use sqlx::PgPool;

/// Connect to the test database and apply migrations.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails; these
/// helpers are only reachable from `#[ignore]`d tests.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("SHOPASSIST_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("set SHOPASSIST_TEST_DATABASE_URL to run database tests");

    let pool = shopassist_server::db::create_pool(&url)
        .await
        .expect("failed to connect to the test database");

    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Generate a unique name so repeated test runs don't collide on unique
/// indexes.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix} {nanos}-{count}")
}

/// Ensure the demo user that chat orders are attributed to exists.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn ensure_demo_user(pool: &PgPool) {
    sqlx::query(
        r"
        INSERT INTO users (id, email, password_hash, full_name)
        VALUES (1, 'demo@example.com', 'not-a-real-hash', 'Demo User')
        ON CONFLICT (id) DO NOTHING
        ",
    )
    .execute(pool)
    .await
    .expect("failed to ensure demo user");
}
