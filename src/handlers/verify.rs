//! Checkout-callback verification.
//!
//! After a browser checkout completes, the frontend posts the tuple Razorpay
//! handed it so the order/payment binding can be checked server-side. The
//! signature here covers `order_id|payment_id` and is keyed with the API key
//! secret - a different input and key than the webhook signature.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::razorpay::checkout_signature_payload;
use crate::signature;

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
}

pub async fn verify_checkout_payment(
    State(state): State<AppState>,
    Json(req): Json<VerifyPaymentRequest>,
) -> (StatusCode, Json<VerifyPaymentResponse>) {
    let payload = checkout_signature_payload(&req.razorpay_order_id, &req.razorpay_payment_id);

    if signature::verify_signature(
        &state.razorpay_key_secret,
        payload.as_bytes(),
        &req.razorpay_signature,
    ) {
        (
            StatusCode::OK,
            Json(VerifyPaymentResponse {
                success: true,
                message: "Payment verified successfully".to_string(),
            }),
        )
    } else {
        tracing::warn!(
            "Checkout verification failed for order {} / payment {}",
            req.razorpay_order_id,
            req.razorpay_payment_id
        );
        (
            StatusCode::BAD_REQUEST,
            Json(VerifyPaymentResponse {
                success: false,
                message: "Payment verification failed".to_string(),
            }),
        )
    }
}
