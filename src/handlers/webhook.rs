//! Inbound Razorpay webhook pipeline: authenticate, deduplicate, settle,
//! relay.
//!
//! Response policy. Razorpay resends on any non-2xx, so a non-200 is
//! returned only when a resend could actually help:
//!
//! | outcome                              | resend helps? | status |
//! |--------------------------------------|---------------|--------|
//! | missing / malformed signature header | yes           | 400    |
//! | invalid signature                    | yes           | 400    |
//! | structurally invalid payload         | yes           | 400    |
//! | duplicate event                      | no            | 200    |
//! | non-creditable event type            | no            | 200    |
//! | customer not found                   | no            | 200    |
//! | storage failure                      | no            | 200    |
//! | downstream forwarding failure        | no            | 200    |
//!
//! Failures after authentication are acknowledged with `success: false` and
//! surfaced through logs; returning 5xx for them would only trigger a retry
//! storm for errors a resend cannot fix.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::db::AppState;
use crate::forward::{NotificationMetadata, PaymentNotification};
use crate::ledger::{self, SettlementOutcome};
use crate::models::{CreatePaymentTransaction, PaymentStatus};
use crate::razorpay::{EventKind, RazorpayEvent, SIGNATURE_HEADER};
use crate::signature;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

type WebhookResponse = (StatusCode, Json<WebhookAck>);

fn ack(success: bool, message: impl Into<String>) -> WebhookResponse {
    (
        StatusCode::OK,
        Json(WebhookAck {
            success,
            message: message.into(),
        }),
    )
}

fn reject(message: impl Into<String>) -> WebhookResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(WebhookAck {
            success: false,
            message: message.into(),
        }),
    )
}

pub async fn handle_razorpay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResponse {
    let signature = match headers.get(SIGNATURE_HEADER) {
        Some(value) => match value.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => return reject("Invalid signature header"),
        },
        None => return reject("Missing signature header"),
    };

    // Sole authentication boundary. Runs against the raw request bytes,
    // never a re-serialization.
    if !signature::verify_signature(&state.razorpay_webhook_secret, &body, &signature) {
        tracing::warn!("Rejected webhook with invalid signature");
        return reject("Invalid signature");
    }

    let event: RazorpayEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("Invalid webhook payload: {}", e);
            return reject("Invalid webhook payload");
        }
    };

    match event.kind() {
        EventKind::Captured => settle_captured(&state, &event).await,
        EventKind::Authorized => {
            tracing::info!(
                "Payment {} authorized but not yet captured; awaiting capture event",
                event.payload.payment.entity.id
            );
            ack(true, "Payment authorized; awaiting capture")
        }
        EventKind::Failed => {
            tracing::info!("Payment {} failed; nothing to settle", event.payload.payment.entity.id);
            ack(true, "Payment failed; nothing to settle")
        }
        EventKind::Other => {
            tracing::debug!("Skipping unhandled event type: {}", event.event);
            ack(true, format!("Skipped event type: {}", event.event))
        }
    }
}

async fn settle_captured(state: &AppState, event: &RazorpayEvent) -> WebhookResponse {
    let entity = &event.payload.payment.entity;

    // Advisory short-circuit for replays within the retention window. The
    // durable check happens again inside the ledger transaction.
    if state.event_cache.is_processed(&entity.id, &event.event) {
        return ack(true, "Event already processed");
    }

    let Some(customer_id) = entity.notes.customer_id.clone() else {
        tracing::warn!(
            "No customer ID in notes for payment {}; acknowledging without credit",
            entity.id
        );
        return ack(true, "No customer reference; nothing to settle");
    };

    let Some(status) = PaymentStatus::from_str(&entity.status) else {
        tracing::warn!(
            "Payment {} carries non-creditable status '{}'",
            entity.id,
            entity.status
        );
        return ack(true, "Payment not in a creditable status");
    };

    let input = CreatePaymentTransaction {
        payment_id: entity.id.clone(),
        customer_id,
        amount: entity.amount_in_rupees(),
        status,
    };

    let outcome = {
        let mut conn = match state.db.get() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("DB connection error: {}", e);
                return ack(false, "Failed to process payment");
            }
        };
        ledger::apply_payment(&mut conn, &input)
    };

    match outcome {
        Ok(SettlementOutcome::Applied { new_balance }) => {
            state.event_cache.mark_processed(&entity.id, &event.event);
            tracing::info!(
                "Credited {} to customer {} for payment {} (balance now {})",
                input.amount,
                input.customer_id,
                entity.id,
                new_balance
            );

            // Best effort; the committed credit is the authoritative
            // outcome either way.
            relay_downstream(state, event, &input).await;

            ack(true, "Payment settled")
        }
        Ok(SettlementOutcome::AlreadyApplied) => {
            state.event_cache.mark_processed(&entity.id, &event.event);
            tracing::info!("Payment {} already processed; ignoring duplicate", entity.id);
            ack(true, "Event already processed")
        }
        Ok(SettlementOutcome::CustomerNotFound) => {
            tracing::error!(
                "Customer {} not found for payment {}",
                input.customer_id,
                entity.id
            );
            ack(false, "Customer not found")
        }
        Err(e) => {
            tracing::error!("Failed to settle payment {}: {}", entity.id, e);
            ack(false, "Failed to process payment")
        }
    }
}

async fn relay_downstream(
    state: &AppState,
    event: &RazorpayEvent,
    input: &CreatePaymentTransaction,
) -> bool {
    let Some(forwarder) = &state.forwarder else {
        return false;
    };

    let entity = &event.payload.payment.entity;
    let notification = PaymentNotification {
        payment_id: entity.id.clone(),
        order_id: entity.order_id.clone(),
        customer_id: input.customer_id.clone(),
        amount: input.amount,
        status: "successful".to_string(),
        event_type: event.event.clone(),
        timestamp: chrono::Utc::now().timestamp(),
        metadata: NotificationMetadata {
            currency: entity.currency.clone(),
            method: entity.method.clone(),
        },
    };

    forwarder.forward(&notification).await
}
