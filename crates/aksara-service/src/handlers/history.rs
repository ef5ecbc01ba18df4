//! Generation history handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use aksara_core::history::truncate_chars;
use aksara_core::{Feature, HistoryEntry, HistoryId};
use aksara_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// One row of a per-feature history listing (no full content).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Entry id.
    pub id: String,
    /// Entry title.
    pub title: String,
    /// Leading slice of the content.
    pub excerpt: String,
    /// Tokens charged.
    pub tokens_used: i64,
    /// Completion time (unix millis).
    pub timestamp: i64,
}

impl From<&HistoryEntry> for HistoryItem {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            title: entry.title.clone(),
            excerpt: entry.excerpt.clone(),
            tokens_used: entry.tokens_used,
            timestamp: entry.timestamp.timestamp_millis(),
        }
    }
}

/// History listing response.
#[derive(Debug, Serialize)]
pub struct HistoryListResponse {
    /// Entries, newest first.
    pub items: Vec<HistoryItem>,
}

/// List the current user's history for one feature.
pub async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(feature): Path<String>,
) -> Result<Json<HistoryListResponse>, ApiError> {
    let feature: Feature = feature
        .parse()
        .map_err(|_| ApiError::BadRequest("Unknown feature".into()))?;

    let items = state
        .store
        .list_history(&auth.user_id, feature)?
        .iter()
        .map(HistoryItem::from)
        .collect();

    Ok(Json(HistoryListResponse { items }))
}

/// Full detail of one history entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDetailResponse {
    /// Entry title.
    pub title: String,
    /// Full generated content.
    pub content: String,
    /// Tokens charged.
    pub tokens_used: i64,
    /// Completion time (unix millis).
    pub timestamp: i64,
}

/// Get one history entry. Scoped to the requesting user and feature.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((feature, id)): Path<(String, String)>,
) -> Result<Json<HistoryDetailResponse>, ApiError> {
    let feature: Feature = feature
        .parse()
        .map_err(|_| ApiError::BadRequest("Unknown feature".into()))?;
    let id: HistoryId = id
        .parse()
        .map_err(|_| ApiError::NotFound("History not found".into()))?;

    let entry = state
        .store
        .get_history_entry(&auth.user_id, feature, &id)?
        .ok_or_else(|| ApiError::NotFound("History not found".into()))?;

    Ok(Json(HistoryDetailResponse {
        title: entry.title,
        content: entry.content,
        tokens_used: entry.tokens_used,
        timestamp: entry.timestamp.timestamp_millis(),
    }))
}

/// One legacy chat session summary.
#[derive(Debug, Serialize)]
pub struct LegacySessionItem {
    /// Session id.
    pub id: String,
    /// First user message, truncated to 40 characters.
    pub title: String,
    /// Number of messages in the session.
    pub count: usize,
}

/// Legacy session listing response.
#[derive(Debug, Serialize)]
pub struct LegacyListResponse {
    /// Session summaries.
    pub items: Vec<LegacySessionItem>,
}

/// List the legacy chat sessions (`memory.json`).
///
/// The legacy file is read best-effort: an unreadable file yields an empty
/// listing rather than an error.
pub async fn legacy_sessions(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> Json<LegacyListResponse> {
    let sessions = state.store.load_legacy_sessions().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Failed to load legacy sessions");
        BTreeMap::new()
    });

    let items = sessions
        .into_iter()
        .map(|(id, messages)| {
            let title = messages
                .iter()
                .find(|m| m.role == "user")
                .map_or_else(|| "Session".to_string(), |m| truncate_chars(&m.content, 40));
            LegacySessionItem {
                id,
                title,
                count: messages.len(),
            }
        })
        .collect();

    Json(LegacyListResponse { items })
}
