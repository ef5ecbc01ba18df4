//! Aksara HTTP API Service.
//!
//! This crate provides the HTTP API for the Aksara creative-writing service,
//! including:
//!
//! - Registration, login, and bearer-token authentication
//! - Token-metered generation endpoints (chat, cerpen, skenario, rewrite,
//!   novel suite)
//! - Token top-ups via Midtrans Snap, with webhook settlement
//! - Per-feature generation history
//! - Owner-only user administration
//!
//! # Authentication
//!
//! Requests authenticate with an HS256 bearer token carrying the user id,
//! username, and owner flag, valid for 7 days.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async for routing consistency

pub mod ai;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod midtrans;
pub mod routes;
pub mod state;

pub use ai::{AiClient, CompletionRequest};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use midtrans::MidtransClient;
pub use routes::create_router;
pub use state::AppState;
