//! Authentication: token issuing and request extractors.
//!
//! This module provides:
//! - [`issue_token`] - sign a 7-day HS256 bearer token for a user
//! - [`AuthUser`] - extractor for any authenticated user
//! - [`OwnerAuth`] - extractor for owner-privileged endpoints

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use aksara_core::{User, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer token validity window, in days.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// JWT claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    /// Username at issue time.
    pub username: String,
    /// Owner flag at issue time.
    #[serde(default)]
    pub is_owner: bool,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration time (unix seconds).
    pub exp: i64,
}

/// Sign a bearer token for a user.
///
/// # Errors
///
/// Returns `ApiError::Internal` if signing fails.
pub fn issue_token(secret: &str, user: &User) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        is_owner: user.is_owner,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to sign token");
        ApiError::Internal("Failed to sign token".into())
    })
}

/// Decode and validate a bearer token.
fn decode_claims(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::InvalidToken
    })
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)
}

/// An authenticated user extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user id.
    pub user_id: UserId,
    /// Username from the token claims.
    pub username: String,
    /// Owner flag from the token claims.
    pub is_owner: bool,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = bearer_token(parts)?;
            let claims = decode_claims(&state.config.jwt_secret, token)?;

            let user_id = claims
                .sub
                .parse::<UserId>()
                .map_err(|_| ApiError::InvalidToken)?;

            Ok(AuthUser {
                user_id,
                username: claims.username,
                is_owner: claims.is_owner,
            })
        })
    }
}

/// An authenticated owner, for administrative endpoints.
///
/// Rejects with 403 when the token is valid but lacks the owner flag.
#[derive(Debug, Clone)]
pub struct OwnerAuth {
    /// The owner's user id.
    pub user_id: UserId,
    /// Username from the token claims.
    pub username: String,
}

impl FromRequestParts<Arc<AppState>> for OwnerAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = bearer_token(parts)?;
            let claims = decode_claims(&state.config.jwt_secret, token)?;

            if !claims.is_owner {
                return Err(ApiError::Forbidden);
            }

            let user_id = claims
                .sub
                .parse::<UserId>()
                .map_err(|_| ApiError::InvalidToken)?;

            Ok(OwnerAuth {
                user_id,
                username: claims.username,
            })
        })
    }
}
