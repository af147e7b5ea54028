//! Test utilities and fixtures for walletgate integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub use walletgate::db::{init_db, queries, AppState};
pub use walletgate::dedup::EventCache;
pub use walletgate::models::*;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const TEST_KEY_SECRET: &str = "key_secret_test789";

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a test customer with a zero balance
pub fn create_test_customer(conn: &Connection, id: &str) -> Customer {
    queries::create_customer(conn, id).expect("Failed to create test customer")
}

/// Create an AppState for testing with an in-memory database.
///
/// The pool is capped at one connection: each `:memory:` connection is its
/// own database, so every request must reuse the connection the schema was
/// created on.
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        razorpay_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        razorpay_key_secret: TEST_KEY_SECRET.to_string(),
        event_cache: Arc::new(EventCache::default()),
        forwarder: None,
    }
}

/// Create a Router with all endpoints
pub fn test_app(state: AppState) -> Router {
    walletgate::handlers::router().with_state(state)
}

/// Compute the signature Razorpay would attach to `body`
pub fn sign_body(body: &[u8], secret: &str) -> String {
    walletgate::signature::compute_signature(secret, body)
}

/// Build a captured-payment webhook body in Razorpay's wire format
pub fn captured_event_body(
    payment_id: &str,
    order_id: &str,
    amount_paise: u64,
    customer_id: Option<&str>,
) -> Vec<u8> {
    let notes = match customer_id {
        Some(id) => serde_json::json!({ "customerId": id }),
        None => serde_json::json!({}),
    };
    serde_json::to_vec(&serde_json::json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "order_id": order_id,
                    "amount": amount_paise,
                    "status": "captured",
                    "currency": "INR",
                    "method": "upi",
                    "notes": notes
                }
            }
        }
    }))
    .unwrap()
}

/// Build an authorized-payment webhook body
pub fn authorized_event_body(
    payment_id: &str,
    order_id: &str,
    amount_paise: u64,
    customer_id: &str,
) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "event": "payment.authorized",
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "order_id": order_id,
                    "amount": amount_paise,
                    "status": "authorized",
                    "currency": "INR",
                    "method": "upi",
                    "notes": { "customerId": customer_id }
                }
            }
        }
    }))
    .unwrap()
}

/// POST a body to the webhook endpoint with the given signature header value
pub fn webhook_request(body: Vec<u8>, signature: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri("/webhook/razorpay")
        .header("content-type", "application/json")
        .header("x-razorpay-signature", signature)
        .body(axum::body::Body::from(body))
        .unwrap()
}

/// POST a correctly signed body to the webhook endpoint
pub fn signed_webhook_request(body: Vec<u8>) -> axum::http::Request<axum::body::Body> {
    let signature = sign_body(&body, TEST_WEBHOOK_SECRET);
    webhook_request(body, &signature)
}

/// Read a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("Response should be valid JSON")
}
