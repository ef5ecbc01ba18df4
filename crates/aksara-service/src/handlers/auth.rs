//! Authentication and account handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use aksara_core::User;
use aksara_store::Store;

use crate::auth::{issue_token, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// bcrypt cost factor for password hashing.
const BCRYPT_COST: u32 = 10;

/// Public view of a user. Never exposes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
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
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            tokens: user.tokens,
            is_owner: user.is_owner,
        }
    }
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

/// Registration response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Freshly signed bearer token.
    pub token: String,
    /// The signup bonus, surfaced so the client can show a welcome popup.
    pub bonus_tokens: i64,
    /// The created user.
    pub user: PublicUser,
}

/// Register a new user.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if body.username.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username, email & password required".into(),
        ));
    }

    let password_hash = bcrypt::hash(&body.password, BCRYPT_COST).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        ApiError::Internal("Register failed".into())
    })?;

    let user = User::new(
        body.username,
        body.email,
        password_hash,
        state.config.signup_bonus_tokens,
    );
    state.store.create_user(&user)?;

    let token = issue_token(&state.config.jwt_secret, &user)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(RegisterResponse {
        token,
        bonus_tokens: state.config.signup_bonus_tokens,
        user: PublicUser::from(&user),
    }))
}

/// Login request. The credential may be a username or an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email, matched case-insensitively.
    #[serde(default)]
    pub credential: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Freshly signed bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: PublicUser,
}

/// Authenticate with a username-or-email credential and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .store
        .find_user_by_credential(&body.credential)?
        .ok_or_else(|| {
            tracing::warn!(credential = %body.credential, "Login failed: user not found");
            ApiError::InvalidCredentials
        })?;

    let password_ok = bcrypt::verify(&body.password, &user.password_hash).unwrap_or(false);
    if !password_ok {
        tracing::warn!(credential = %body.credential, "Login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&state.config.jwt_secret, &user)?;

    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// Get the current user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(PublicUser::from(&user)))
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// Always `true`.
    pub ok: bool,
}

/// Logout. The client drops its token; the server just acknowledges.
pub async fn logout(_auth: AuthUser) -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current token balance.
    pub tokens: i64,
}

/// Get the current user's token balance.
pub async fn balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(BalanceResponse {
        tokens: user.tokens,
    }))
}
