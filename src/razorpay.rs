//! Razorpay webhook wire format.
//!
//! Payloads are parsed into strict types at the boundary so a missing
//! required field becomes a 400 at parse time instead of a crash later.
//! Only the fields the settlement pipeline consumes are modeled.

use serde::Deserialize;

/// Header carrying the hex-encoded HMAC-SHA256 of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Razorpay amounts arrive in paise; the ledger stores whole rupees.
pub const PAISE_PER_RUPEE: u64 = 100;

/// Event types this service acts on. Everything else is acknowledged
/// without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Funds captured - the only creditable event.
    Captured,
    /// Authorized but not yet captured; acknowledged while awaiting capture.
    Authorized,
    Failed,
    Other,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayEvent {
    pub event: String,
    pub payload: EventPayload,
}

#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub payment: PaymentPayload,
}

#[derive(Debug, Deserialize)]
pub struct PaymentPayload {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub order_id: String,
    /// Minor currency units (paise). Non-negative by construction.
    pub amount: u64,
    pub status: String,
    #[serde(default)]
    pub notes: PaymentNotes,
    pub currency: Option<String>,
    pub method: Option<String>,
}

/// Free-form merchant notes attached at order creation. The customer
/// reference travels here.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentNotes {
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
}

impl RazorpayEvent {
    pub fn kind(&self) -> EventKind {
        match self.event.as_str() {
            "payment.captured" => EventKind::Captured,
            "payment.authorized" => EventKind::Authorized,
            "payment.failed" => EventKind::Failed,
            _ => EventKind::Other,
        }
    }
}

impl PaymentEntity {
    /// Paise to whole rupees, truncating. This is the single conversion
    /// point; the ledger never re-derives amounts.
    pub fn amount_in_rupees(&self) -> i64 {
        (self.amount / PAISE_PER_RUPEE) as i64
    }
}

/// Message a checkout callback signs: `order_id|payment_id`, keyed with the
/// API key secret (not the webhook secret).
pub fn checkout_signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{}|{}", order_id, payment_id)
}
