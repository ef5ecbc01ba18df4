//! Top-up transaction types.
//!
//! A transaction is created in `Pending` state when a checkout session is
//! opened with the payment gateway, and moves to `Success` or `Failed`
//! exactly once when the gateway's webhook reports the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, TokenPackage, UserId};

/// Status of a top-up transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Checkout session created, payment not yet settled.
    Pending,
    /// Payment settled; tokens credited.
    Success,
    /// Payment cancelled, denied, or expired.
    Failed,
}

impl TransactionStatus {
    /// Whether this status is final. Terminal statuses never transition again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The status as its serialized tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// A token top-up purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupTransaction {
    /// Order id, echoed back by the gateway in webhook notifications.
    pub order_id: OrderId,

    /// Purchasing user.
    pub user_id: UserId,

    /// Catalog package that was bought.
    pub package_id: String,

    /// Tokens to credit on success.
    pub tokens: i64,

    /// Price in Rupiah.
    pub amount: i64,

    /// Current status.
    pub status: TransactionStatus,

    /// When the checkout session was created.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// When the transaction reached a terminal status.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,

    /// Gateway session token for the hosted checkout page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_token: Option<String>,

    /// Gateway redirect URL for the hosted checkout page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_url: Option<String>,
}

impl TopupTransaction {
    /// Create a pending transaction for a freshly opened checkout session.
    #[must_use]
    pub fn pending(
        order_id: OrderId,
        user_id: UserId,
        package: &TokenPackage,
        snap_token: impl Into<String>,
        snap_url: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            user_id,
            package_id: package.id.clone(),
            tokens: package.tokens,
            amount: package.price,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            snap_token: Some(snap_token.into()),
            snap_url: Some(snap_url.into()),
        }
    }

    /// Apply a status transition, enforcing monotonicity.
    ///
    /// Returns `true` when the status actually changed. Terminal statuses are
    /// final, and re-applying the current status is a no-op, so a redelivered
    /// webhook notification cannot re-trigger the transition's side effects.
    pub fn transition(&mut self, next: TransactionStatus) -> bool {
        if self.status.is_terminal() || next == self.status {
            return false;
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        true
    }
}
