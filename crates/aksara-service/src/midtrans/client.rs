//! Midtrans Snap API client implementation.

use std::time::Duration;

use reqwest::Client;

use crate::crypto::{constant_time_eq, sha512_hex};

use super::types::{PaymentNotification, SnapErrorResponse, SnapSession, SnapTransactionRequest};

/// Error type for Midtrans operations.
#[derive(Debug, thiserror::Error)]
pub enum MidtransError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Midtrans API returned an error.
    #[error("Midtrans API error: {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Notification signature missing or mismatched.
    #[error("invalid notification signature")]
    InvalidSignature,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Midtrans Snap API client.
#[derive(Debug, Clone)]
pub struct MidtransClient {
    client: Client,
    base_url: String,
    server_key: String,
}

impl MidtransClient {
    /// Create a new Midtrans client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Snap API base URL (sandbox or production)
    /// * `server_key` - Midtrans server key (`SB-Mid-server-...` in sandbox)
    ///
    /// # Errors
    ///
    /// Returns `MidtransError::Configuration` if the HTTP client cannot be
    /// built.
    pub fn new(
        base_url: impl Into<String>,
        server_key: impl Into<String>,
    ) -> Result<Self, MidtransError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MidtransError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            server_key: server_key.into(),
        })
    }

    /// Create a Snap checkout session for an order payload.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success gateway status.
    pub async fn create_snap_transaction(
        &self,
        request: &SnapTransactionRequest,
    ) -> Result<SnapSession, MidtransError> {
        let url = format!("{}/snap/v1/transactions", self.base_url);

        let response = self
            .client
            .post(&url)
            // Snap authenticates with the server key as basic-auth user.
            .basic_auth(&self.server_key, Some(""))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = match response.json::<SnapErrorResponse>().await {
                Ok(err) if !err.error_messages.is_empty() => err.error_messages.join("; "),
                _ => "unknown error".to_string(),
            };
            return Err(MidtransError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Verify a notification's `signature_key`.
    ///
    /// The signature is SHA-512 over
    /// `order_id + status_code + gross_amount + server_key`.
    ///
    /// # Errors
    ///
    /// Returns `MidtransError::InvalidSignature` when any signature field is
    /// missing or the digest does not match.
    pub fn verify_notification(
        &self,
        notification: &PaymentNotification,
    ) -> Result<(), MidtransError> {
        let (Some(status_code), Some(gross_amount), Some(signature)) = (
            notification.status_code.as_deref(),
            notification.gross_amount.as_deref(),
            notification.signature_key.as_deref(),
        ) else {
            return Err(MidtransError::InvalidSignature);
        };

        let expected = sha512_hex(&format!(
            "{}{status_code}{gross_amount}{}",
            notification.order_id, self.server_key
        ));

        if constant_time_eq(&expected, signature) {
            Ok(())
        } else {
            Err(MidtransError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_notification(server_key: &str) -> PaymentNotification {
        let order_id = "TOPUP-1700000000000-deadbeef";
        let status_code = "200";
        let gross_amount = "10000.00";
        PaymentNotification {
            order_id: order_id.into(),
            transaction_status: "settlement".into(),
            fraud_status: None,
            status_code: Some(status_code.into()),
            gross_amount: Some(gross_amount.into()),
            signature_key: Some(sha512_hex(&format!(
                "{order_id}{status_code}{gross_amount}{server_key}"
            ))),
        }
    }

    #[test]
    fn valid_signature_verifies() {
        let client = MidtransClient::new("https://app.sandbox.midtrans.com", "server-key").unwrap();
        assert!(client
            .verify_notification(&signed_notification("server-key"))
            .is_ok());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let client = MidtransClient::new("https://app.sandbox.midtrans.com", "other-key").unwrap();
        assert!(matches!(
            client.verify_notification(&signed_notification("server-key")),
            Err(MidtransError::InvalidSignature)
        ));
    }

    #[test]
    fn missing_signature_fields_fail_verification() {
        let client = MidtransClient::new("https://app.sandbox.midtrans.com", "server-key").unwrap();
        let mut notification = signed_notification("server-key");
        notification.signature_key = None;
        assert!(matches!(
            client.verify_notification(&notification),
            Err(MidtransError::InvalidSignature)
        ));
    }
}
