//! Wire types for the AI providers.

use serde::{Deserialize, Serialize};

/// One chat message in the OpenAI-style schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role (`system`, `user`, `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a `user` message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    /// Build a `system` message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }
}

/// Groq chat-completions request body.
#[derive(Debug, Serialize)]
pub struct GroqChatRequest {
    /// Model name.
    pub model: String,
    /// Conversation transcript.
    pub messages: Vec<ChatMessage>,
}

/// Groq chat-completions response body.
#[derive(Debug, Deserialize)]
pub struct GroqChatResponse {
    /// Completion choices (the first one is used).
    #[serde(default)]
    pub choices: Vec<GroqChoice>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
pub struct GroqChoice {
    /// The completion message.
    pub message: GroqChoiceMessage,
}

/// The message of a completion choice.
#[derive(Debug, Deserialize)]
pub struct GroqChoiceMessage {
    /// Generated text, absent on filtered/empty completions.
    #[serde(default)]
    pub content: Option<String>,
}

/// Gemini `generateContent` request body.
#[derive(Debug, Serialize)]
pub struct GeminiGenerateRequest {
    /// Content blocks (a single flattened text part).
    pub contents: Vec<GeminiContent>,
}

/// A Gemini content block.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// One part of a Gemini content block.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Part text.
    pub text: String,
}

/// Gemini `generateContent` response body.
#[derive(Debug, Deserialize)]
pub struct GeminiGenerateResponse {
    /// Candidate completions (the first one is used).
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// One Gemini candidate completion.
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    /// The candidate's content.
    pub content: GeminiContent,
}
