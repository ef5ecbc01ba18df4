//! Owner-only user administration handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use aksara_core::{User, UserId};
use aksara_store::Store;

use crate::auth::OwnerAuth;
use crate::error::ApiError;
use crate::handlers::auth::OkResponse;
use crate::state::AppState;

/// One row of the admin user listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    /// User id.
    pub id: String,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Current token balance.
    pub tokens: i64,
    /// Owner flag.
    pub is_owner: bool,
    /// Registration time (unix millis).
    pub created_at: i64,
}

impl From<&User> for AdminUserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            tokens: user.tokens,
            is_owner: user.is_owner,
            created_at: user.created_at.timestamp_millis(),
        }
    }
}

/// Admin user listing response.
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    /// All registered users.
    pub users: Vec<AdminUserRow>,
}

/// List all users.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _owner: OwnerAuth,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let users = state
        .store
        .list_users()?
        .iter()
        .map(AdminUserRow::from)
        .collect();

    Ok(Json(ListUsersResponse { users }))
}

/// Token adjustment request. The amount may be negative; the resulting
/// balance is clamped at zero.
#[derive(Debug, Deserialize)]
pub struct AdjustTokensRequest {
    /// Balance delta. Must be non-zero.
    #[serde(default)]
    pub amount: i64,
}

/// Token adjustment response.
#[derive(Debug, Serialize)]
pub struct AdjustTokensResponse {
    /// The adjusted user's name.
    pub username: String,
    /// Balance after the adjustment.
    pub tokens: i64,
}

/// Adjust a user's token balance.
pub async fn adjust_tokens(
    State(state): State<Arc<AppState>>,
    owner: OwnerAuth,
    Path(user_id): Path<String>,
    Json(body): Json<AdjustTokensRequest>,
) -> Result<Json<AdjustTokensResponse>, ApiError> {
    if body.amount == 0 {
        return Err(ApiError::BadRequest("Invalid amount".into()));
    }

    let user_id: UserId = user_id
        .parse()
        .map_err(|_| ApiError::NotFound("User not found".into()))?;

    let user = state
        .store
        .get_user(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let tokens = state.store.adjust_tokens(&user_id, body.amount)?;

    tracing::info!(
        admin = %owner.username,
        user_id = %user_id,
        delta = body.amount,
        new_balance = tokens,
        "Admin adjusted token balance"
    );

    Ok(Json(AdjustTokensResponse {
        username: user.username,
        tokens,
    }))
}

/// Delete a user. Owners cannot delete themselves.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    owner: OwnerAuth,
    Path(user_id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| ApiError::NotFound("User not found".into()))?;

    if user_id == owner.user_id {
        return Err(ApiError::BadRequest("Cannot delete yourself".into()));
    }

    state.store.delete_user(&user_id)?;

    tracing::info!(admin = %owner.username, user_id = %user_id, "Admin deleted user");

    Ok(Json(OkResponse { ok: true }))
}
