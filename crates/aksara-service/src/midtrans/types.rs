//! Wire types for the Midtrans Snap API.

use serde::{Deserialize, Serialize};

use aksara_core::TransactionStatus;

/// Snap checkout session request body.
#[derive(Debug, Serialize)]
pub struct SnapTransactionRequest {
    /// Order id and amount.
    pub transaction_details: TransactionDetails,
    /// Line items shown on the checkout page.
    pub item_details: Vec<ItemDetail>,
    /// Purchaser details.
    pub customer_details: CustomerDetails,
    /// Payment methods offered on the checkout page.
    pub enabled_payments: Vec<String>,
}

/// Order id and gross amount of a Snap transaction.
#[derive(Debug, Serialize)]
pub struct TransactionDetails {
    /// Order id, echoed back in webhook notifications.
    pub order_id: String,
    /// Total price in Rupiah.
    pub gross_amount: i64,
}

/// One checkout line item.
#[derive(Debug, Serialize)]
pub struct ItemDetail {
    /// Item id (the package id).
    pub id: String,
    /// Unit price in Rupiah.
    pub price: i64,
    /// Quantity.
    pub quantity: u32,
    /// Display name.
    pub name: String,
}

/// Purchaser details attached to the checkout session.
#[derive(Debug, Serialize)]
pub struct CustomerDetails {
    /// Purchaser name.
    pub first_name: String,
    /// Purchaser email.
    pub email: String,
}

/// Snap checkout session, as returned by the gateway.
#[derive(Debug, Deserialize)]
pub struct SnapSession {
    /// Session token for the embedded checkout widget.
    pub token: String,
    /// URL of the hosted checkout page.
    pub redirect_url: String,
}

/// Snap API error body.
#[derive(Debug, Deserialize)]
pub struct SnapErrorResponse {
    /// Error messages reported by the gateway.
    #[serde(default)]
    pub error_messages: Vec<String>,
}

/// An asynchronous payment notification delivered to the webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    /// The order this notification is about.
    pub order_id: String,
    /// Gateway status vocabulary (`capture`, `settlement`, `pending`, ...).
    pub transaction_status: String,
    /// Fraud detection verdict for card payments.
    #[serde(default)]
    pub fraud_status: Option<String>,
    /// Gateway status code, part of the signature input.
    #[serde(default)]
    pub status_code: Option<String>,
    /// Gross amount as a decimal string, part of the signature input.
    #[serde(default)]
    pub gross_amount: Option<String>,
    /// SHA-512 signature over order id, status code, gross amount and the
    /// server key.
    #[serde(default)]
    pub signature_key: Option<String>,
}

impl PaymentNotification {
    /// Map the gateway status vocabulary onto a transaction status.
    ///
    /// `capture`/`settlement` count as success only when the fraud status is
    /// `accept` or absent; a `challenge` verdict leaves the transaction
    /// untouched. Unknown statuses are ignored.
    #[must_use]
    pub fn resolved_status(&self) -> Option<TransactionStatus> {
        match self.transaction_status.as_str() {
            "capture" | "settlement" => match self.fraud_status.as_deref() {
                Some("accept") | None => Some(TransactionStatus::Success),
                _ => None,
            },
            "pending" => Some(TransactionStatus::Pending),
            "cancel" | "deny" | "expire" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}
