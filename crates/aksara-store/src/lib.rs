//! JSON-file storage layer for Aksara.
//!
//! This crate persists users, top-up transactions, and generation history as
//! whole-collection JSON files, fronted by an in-memory write-through cache.
//!
//! # Consistency policy
//!
//! All collections live behind one lock. Read-modify-write cycles (balance
//! deduction, webhook settlement) run entirely under the write lock, so two
//! concurrent deductions for the same user cannot both pass the balance
//! check. Every mutation rewrites the affected collection's file before the
//! lock is released.
//!
//! # Durability
//!
//! Durability is best-effort: when a file write fails the error is logged and
//! the in-memory state remains authoritative, so a process restart can roll
//! back to the last successfully written snapshot. Callers are never failed
//! on a persist error.
//!
//! # Example
//!
//! ```no_run
//! use aksara_store::{JsonStore, Store};
//! use aksara_core::User;
//!
//! let store = JsonStore::open("/tmp/aksara-data").unwrap();
//!
//! let user = User::new("alice", "a@x.com", "$2b$10$hash", 500);
//! store.create_user(&user).unwrap();
//!
//! let outcome = store.deduct_tokens(&user.id, 1).unwrap();
//! assert!(outcome.ok);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod json;

pub use error::{Result, StoreError};
pub use json::JsonStore;

use std::collections::BTreeMap;

use aksara_core::{
    Feature, HistoryEntry, HistoryId, LegacyMessage, OrderId, TopupTransaction, TransactionStatus,
    User, UserId,
};

/// Result of a balance deduction.
///
/// Insufficient balance is a soft failure, not an error: `ok` is `false` and
/// `tokens` carries the untouched balance for the 402 response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductOutcome {
    /// Whether the deduction was applied.
    pub ok: bool,
    /// Balance after the call (unchanged when `ok` is `false`).
    pub tokens: i64,
}

/// Result of applying a gateway status to a top-up transaction.
#[derive(Debug, Clone)]
pub struct GatewayOutcome {
    /// The transaction after the call.
    pub transaction: TopupTransaction,
    /// Whether the status transition was applied. Redelivered notifications
    /// for an already-terminal transaction report `false`.
    pub applied: bool,
    /// The owner's balance after crediting, set only when this call moved the
    /// transaction to `Success`.
    pub credited_balance: Option<i64>,
}

/// The storage trait defining all persistence operations.
///
/// This abstracts the storage layer so handlers and tests can share one
/// contract. The only shipped implementation is [`JsonStore`].
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user, enforcing case-insensitive username/email uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` naming the conflicting field.
    fn create_user(&self, user: &User) -> Result<()>;

    /// Insert or replace a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be updated.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Find a user whose username or email equals `credential`
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    fn find_user_by_credential(&self, credential: &str) -> Result<Option<User>>;

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    fn list_users(&self) -> Result<Vec<User>>;

    /// Delete a user by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn delete_user(&self, user_id: &UserId) -> Result<()>;

    // =========================================================================
    // Token Ledger Operations
    // =========================================================================

    /// Deduct `amount` tokens from a user's balance.
    ///
    /// Soft-fails (returns `ok: false` with the current balance) when the
    /// balance does not cover `amount`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn deduct_tokens(&self, user_id: &UserId, amount: i64) -> Result<DeductOutcome>;

    /// Credit `amount` tokens to a user's balance. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn add_tokens(&self, user_id: &UserId, amount: i64) -> Result<i64>;

    /// Adjust a user's balance by `delta` (admin path), clamping the result
    /// at zero. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn adjust_tokens(&self, user_id: &UserId, delta: i64) -> Result<i64>;

    // =========================================================================
    // Top-up Transaction Operations
    // =========================================================================

    /// Insert a top-up transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be updated.
    fn put_transaction(&self, transaction: &TopupTransaction) -> Result<()>;

    /// Get a transaction by order id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    fn get_transaction(&self, order_id: &OrderId) -> Result<Option<TopupTransaction>>;

    /// List a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    fn list_transactions_by_user(&self, user_id: &UserId) -> Result<Vec<TopupTransaction>>;

    /// Apply a gateway-reported status to a transaction and, when the
    /// transaction first reaches `Success`, credit the purchased tokens to
    /// its owner — all under one lock, exactly once per order id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the transaction doesn't exist.
    fn apply_gateway_status(
        &self,
        order_id: &OrderId,
        next: TransactionStatus,
    ) -> Result<GatewayOutcome>;

    // =========================================================================
    // Generation History Operations
    // =========================================================================

    /// Append a history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be updated.
    fn append_history(&self, entry: &HistoryEntry) -> Result<()>;

    /// List a user's history for one feature, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    fn list_history(&self, user_id: &UserId, feature: Feature) -> Result<Vec<HistoryEntry>>;

    /// Get one history entry, scoped to its owner and feature.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    fn get_history_entry(
        &self,
        user_id: &UserId,
        feature: Feature,
        id: &HistoryId,
    ) -> Result<Option<HistoryEntry>>;

    // =========================================================================
    // Legacy Sessions
    // =========================================================================

    /// Load the legacy chat sessions file (`memory.json`): an object keyed by
    /// session id mapping to message arrays. A missing file is an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    fn load_legacy_sessions(&self) -> Result<BTreeMap<String, Vec<LegacyMessage>>>;
}
