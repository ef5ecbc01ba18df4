//! Midtrans Snap integration for token top-ups.
//!
//! Midtrans handles:
//! - Hosted checkout sessions (Snap)
//! - Asynchronous payment notifications (webhook)

pub mod client;
pub mod types;

pub use client::{MidtransClient, MidtransError};
pub use types::{
    CustomerDetails, ItemDetail, PaymentNotification, SnapSession, SnapTransactionRequest,
    TransactionDetails,
};
