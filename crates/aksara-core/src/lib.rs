//! Core types and utilities for Aksara.
//!
//! This crate provides the foundational types used throughout the Aksara
//! creative-writing platform:
//!
//! - **Identifiers**: `UserId`, `HistoryId`, `OrderId`
//! - **Users**: `User` with token balance and owner flag
//! - **Top-ups**: `TopupTransaction`, `TransactionStatus`, `TokenPackage`
//! - **History**: `HistoryEntry`, `Feature`, legacy session messages
//! - **Costs**: the per-feature token cost model
//!
//! # Token Unit
//!
//! A token is the in-app metering unit charged per AI-generation action. It is
//! unrelated to the JWT bearer token used for authentication. Balances are
//! stored as `i64` and are never negative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cost;
pub mod history;
pub mod ids;
pub mod packages;
pub mod transaction;
pub mod user;

pub use history::{
    Feature, HistoryEntry, LegacyMessage, ParseFeatureError, EXCERPT_MAX_CHARS, TITLE_MAX_CHARS,
};
pub use ids::{HistoryId, IdError, OrderId, UserId};
pub use packages::{default_catalog, TokenPackage};
pub use transaction::{TopupTransaction, TransactionStatus};
pub use user::User;
