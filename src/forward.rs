//! Best-effort relay of settled payments to an internal backend.
//!
//! The notification is serialized once, signed over those exact bytes with
//! the internal secret (a separate trust domain from the Razorpay webhook
//! secret), and POSTed with a bounded timeout. A failed relay is logged and
//! reported to the caller; it never reverses the ledger effect, which is the
//! authoritative outcome. Retry policy, if any, belongs to the receiver side.

use std::time::Duration;

use serde::Serialize;

use crate::signature::compute_signature;

/// Header carrying the internal-domain signature on the forwarded body.
pub const FORWARD_SIGNATURE_HEADER: &str = "x-webhook-signature";

const FORWARD_TIMEOUT: Duration = Duration::from_secs(5);

/// Normalized payment data sent downstream. Field names follow the internal
/// backend's wire format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    pub payment_id: String,
    pub order_id: String,
    pub customer_id: String,
    /// Whole rupees, post-conversion.
    pub amount: i64,
    pub status: String,
    pub event_type: String,
    /// Unix timestamp of when this service settled the payment.
    pub timestamp: i64,
    pub metadata: NotificationMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

pub struct Forwarder {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl Forwarder {
    pub fn new(endpoint: String, secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            secret,
        }
    }

    /// Relay one notification. Returns whether the downstream accepted it
    /// (any 2xx). A non-2xx status or network error is a forwarding failure;
    /// there is no internal retry.
    pub async fn forward(&self, notification: &PaymentNotification) -> bool {
        let body = match serde_json::to_vec(notification) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!("Failed to serialize forward notification: {}", e);
                return false;
            }
        };

        // Sign the exact bytes that go on the wire.
        let signature = compute_signature(&self.secret, &body);

        let result = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header(FORWARD_SIGNATURE_HEADER, signature)
            .body(body)
            .timeout(FORWARD_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(
                    "Forwarded payment {} downstream",
                    notification.payment_id
                );
                true
            }
            Ok(resp) => {
                tracing::warn!(
                    "Downstream rejected payment {}: {}",
                    notification.payment_id,
                    resp.status()
                );
                false
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to forward payment {}: {}",
                    notification.payment_id,
                    e
                );
                false
            }
        }
    }
}
