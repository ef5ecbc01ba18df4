//! HTTP request handlers.

pub mod admin;
pub mod auth;
pub mod generate;
pub mod health;
pub mod history;
pub mod topup;
