//! AI completion adapter.
//!
//! Generation requests run through an ordered chain of provider strategies
//! (Groq first, Gemini second). The first success wins; any failure logs a
//! warning and falls through to the next provider. Adding a provider means
//! extending the chain construction in [`client::AiClient::from_config`],
//! not touching call sites.

pub mod client;
pub mod types;

pub use client::{AiClient, AiError, CompletionRequest};
pub use types::ChatMessage;
