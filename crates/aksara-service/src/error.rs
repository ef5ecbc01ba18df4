//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// The bearer token failed validation (malformed, bad signature, expired).
    #[error("invalid token")]
    InvalidToken,

    /// Login with an unknown credential or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Valid token but the owner role is required.
    #[error("forbidden: owner only")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - username or email already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The token balance does not cover the computed cost. Clients
    /// special-case this condition, so the body shape is fixed:
    /// `{"error":"Saldo token habis","tokens":<balance>}`.
    #[error("saldo token habis: {tokens} tersisa")]
    InsufficientTokens {
        /// Current (untouched) balance.
        tokens: i64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// An external service (payment gateway) failed.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// Flat JSON error body. Balance exhaustion additionally carries the
/// current balance.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens: Option<i64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, tokens) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string(), None),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                None,
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Forbidden: Owner only".to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
            Self::InsufficientTokens { tokens } => (
                StatusCode::PAYMENT_REQUIRED,
                "Saldo token habis".to_string(),
                Some(*tokens),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => (StatusCode::BAD_GATEWAY, msg.clone(), None),
        };

        let body = ErrorBody {
            error: message,
            tokens,
        };

        (status, Json(body)).into_response()
    }
}

impl From<aksara_store::StoreError> for ApiError {
    fn from(err: aksara_store::StoreError) -> Self {
        match err {
            aksara_store::StoreError::NotFound { entity, .. } => {
                // Match the wire messages clients already expect.
                let msg = match entity {
                    "user" => "User not found",
                    "transaction" => "Transaction not found",
                    _ => "Not found",
                };
                Self::NotFound(msg.to_string())
            }
            aksara_store::StoreError::Duplicate { field } => {
                let msg = if field == "email" {
                    "Email already registered"
                } else {
                    "Username already taken"
                };
                Self::Conflict(msg.to_string())
            }
            aksara_store::StoreError::Io(msg) | aksara_store::StoreError::Serialization(msg) => {
                Self::Internal(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insufficient_tokens_body_shape_is_fixed() {
        let response = ApiError::InsufficientTokens { tokens: 3 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Saldo token habis", "tokens": 3 })
        );
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_details() {
        let response = ApiError::Internal("secret path /data".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn duplicate_fields_map_to_conflict_messages() {
        let email = ApiError::from(aksara_store::StoreError::Duplicate { field: "email" });
        let username = ApiError::from(aksara_store::StoreError::Duplicate { field: "username" });
        assert!(matches!(email, ApiError::Conflict(msg) if msg == "Email already registered"));
        assert!(matches!(username, ApiError::Conflict(msg) if msg == "Username already taken"));
    }
}
