//! Token top-up handlers: package catalog, checkout sessions, webhook
//! ingestion, and transaction history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use aksara_core::{OrderId, TokenPackage, TopupTransaction, TransactionStatus};
use aksara_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::auth::OkResponse;
use crate::midtrans::{
    CustomerDetails, ItemDetail, PaymentNotification, SnapTransactionRequest, TransactionDetails,
};
use crate::state::AppState;

/// Package catalog response.
#[derive(Debug, Serialize)]
pub struct PackagesResponse {
    /// Purchasable packages.
    pub packages: Vec<TokenPackage>,
}

/// List the purchasable token packages.
pub async fn packages(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> Json<PackagesResponse> {
    Json(PackagesResponse {
        packages: state.config.packages.clone(),
    })
}

/// Checkout creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopupRequest {
    /// Catalog id of the package to buy.
    #[serde(default)]
    pub package_id: String,
}

/// Checkout creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopupResponse {
    /// Order id for later status lookups.
    pub order_id: OrderId,
    /// Snap session token for the embedded checkout widget.
    pub snap_token: String,
    /// URL of the hosted checkout page.
    pub snap_url: String,
    /// The purchased package.
    pub package: TokenPackage,
}

/// Open a checkout session and persist the pending transaction.
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateTopupRequest>,
) -> Result<Json<CreateTopupResponse>, ApiError> {
    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let package = state
        .config
        .packages
        .iter()
        .find(|p| p.id == body.package_id)
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("Invalid package".into()))?;

    let midtrans = state
        .midtrans
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("Payment gateway not configured".into()))?;

    let order_id = OrderId::generate(&user.id);

    let request = SnapTransactionRequest {
        transaction_details: TransactionDetails {
            order_id: order_id.to_string(),
            gross_amount: package.price,
        },
        item_details: vec![ItemDetail {
            id: package.id.clone(),
            price: package.price,
            quantity: 1,
            name: format!("{} - {} Tokens", package.label, package.tokens),
        }],
        customer_details: CustomerDetails {
            first_name: user.username.clone(),
            email: user.email.clone(),
        },
        enabled_payments: vec![
            "shopeepay".into(),
            "dana".into(),
            "seabank_transfer".into(),
        ],
    };

    let session = midtrans
        .create_snap_transaction(&request)
        .await
        .map_err(|e| {
            tracing::error!(order_id = %order_id, error = %e, "Failed to create checkout session");
            ApiError::ExternalService("Failed to create payment".into())
        })?;

    let transaction = TopupTransaction::pending(
        order_id.clone(),
        user.id,
        &package,
        session.token.clone(),
        session.redirect_url.clone(),
    );
    state.store.put_transaction(&transaction)?;

    tracing::info!(
        order_id = %order_id,
        user_id = %user.id,
        package = %package.id,
        "Checkout session created"
    );

    Ok(Json(CreateTopupResponse {
        order_id,
        snap_token: session.token,
        snap_url: session.redirect_url,
        package,
    }))
}

/// Ingest an asynchronous payment notification from the gateway.
///
/// The endpoint is unauthenticated; when the server key is configured the
/// notification signature is verified instead. The settlement credit is
/// idempotent: redelivered notifications for a settled order are ignored.
pub async fn notification(
    State(state): State<Arc<AppState>>,
    Json(notification): Json<PaymentNotification>,
) -> Result<Json<OkResponse>, ApiError> {
    tracing::info!(
        order_id = %notification.order_id,
        status = %notification.transaction_status,
        "Payment notification received"
    );

    if let Some(midtrans) = &state.midtrans {
        midtrans.verify_notification(&notification).map_err(|e| {
            tracing::warn!(
                order_id = %notification.order_id,
                error = %e,
                "Invalid notification signature"
            );
            ApiError::BadRequest("Invalid notification signature".into())
        })?;
    } else {
        tracing::warn!("Midtrans not configured - skipping notification signature verification");
    }

    let Some(next) = notification.resolved_status() else {
        tracing::debug!(
            status = %notification.transaction_status,
            fraud_status = ?notification.fraud_status,
            "Ignoring notification status"
        );
        return Ok(Json(OkResponse { ok: true }));
    };

    let order_id = OrderId::from(notification.order_id.clone());
    let outcome = state.store.apply_gateway_status(&order_id, next)?;

    if let Some(balance) = outcome.credited_balance {
        tracing::info!(
            order_id = %order_id,
            user_id = %outcome.transaction.user_id,
            tokens = outcome.transaction.tokens,
            new_balance = balance,
            "Tokens credited"
        );
    } else if !outcome.applied {
        tracing::info!(
            order_id = %order_id,
            "Notification for settled transaction redelivered - ignored"
        );
    }

    Ok(Json(OkResponse { ok: true }))
}

/// One row of the top-up history listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupRow {
    /// Order id.
    pub order_id: OrderId,
    /// Tokens purchased.
    pub tokens: i64,
    /// Price in Rupiah.
    pub amount: i64,
    /// Transaction status.
    pub status: TransactionStatus,
    /// Creation time (unix millis).
    pub created_at: i64,
    /// Settlement time (unix millis), when terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl From<&TopupTransaction> for TopupRow {
    fn from(tx: &TopupTransaction) -> Self {
        Self {
            order_id: tx.order_id.clone(),
            tokens: tx.tokens,
            amount: tx.amount,
            status: tx.status,
            created_at: tx.created_at.timestamp_millis(),
            completed_at: tx.completed_at.map(|t| t.timestamp_millis()),
        }
    }
}

/// Top-up history response.
#[derive(Debug, Serialize)]
pub struct TopupHistoryResponse {
    /// The user's transactions, newest first.
    pub transactions: Vec<TopupRow>,
}

/// List the current user's top-up transactions.
pub async fn history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<TopupHistoryResponse>, ApiError> {
    let transactions = state
        .store
        .list_transactions_by_user(&auth.user_id)?
        .iter()
        .map(TopupRow::from)
        .collect();

    Ok(Json(TopupHistoryResponse { transactions }))
}

/// Transaction status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupStatusResponse {
    /// Order id.
    pub order_id: OrderId,
    /// Transaction status.
    pub status: TransactionStatus,
    /// Tokens purchased.
    pub tokens: i64,
    /// Price in Rupiah.
    pub amount: i64,
}

/// Check one transaction's status. Scoped to the requesting user.
pub async fn status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<TopupStatusResponse>, ApiError> {
    let order_id = OrderId::from(order_id);
    let transaction = state
        .store
        .get_transaction(&order_id)?
        .filter(|t| t.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

    Ok(Json(TopupStatusResponse {
        order_id: transaction.order_id,
        status: transaction.status,
        tokens: transaction.tokens,
        amount: transaction.amount,
    }))
}
