//! User account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A registered user.
///
/// Serializes to the camelCase record format of the `users.json` data file,
/// with millisecond timestamps, so files written by earlier deployments load
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user id.
    pub id: UserId,

    /// Display/login name. Unique case-insensitively.
    pub username: String,

    /// Email address. Unique case-insensitively.
    pub email: String,

    /// bcrypt hash of the password.
    pub password_hash: String,

    /// Current token balance. Never negative.
    #[serde(default)]
    pub tokens: i64,

    /// Whether this user holds the owner (admin) role.
    #[serde(default)]
    pub is_owner: bool,

    /// When the user registered.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the signup bonus as the starting balance.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        starting_tokens: i64,
    ) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            tokens: starting_tokens,
            is_owner: false,
            created_at: Utc::now(),
        }
    }

    /// Check whether the balance covers a deduction.
    #[must_use]
    pub fn has_sufficient_tokens(&self, amount: i64) -> bool {
        self.tokens >= amount
    }
}
