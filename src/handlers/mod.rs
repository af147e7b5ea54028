pub mod health;
pub mod verify;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook/razorpay", post(webhook::handle_razorpay_webhook))
        .route("/payment/verify", post(verify::verify_checkout_payment))
        .route("/health", get(health::health_check))
}
