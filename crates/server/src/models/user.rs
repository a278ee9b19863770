//! Customer account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopassist_core::{Email, UserId};

/// A customer account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique).
    pub email: Email,
    /// Argon2id password hash. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account has staff privileges.
    pub is_superuser: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
