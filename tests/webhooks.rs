//! End-to-end webhook pipeline tests: signature gate, settlement, replay
//! handling, and the response policy (only authentication and validation
//! failures produce a non-200).

mod common;

use axum::http::StatusCode;
use common::*;
use tower::ServiceExt;

#[tokio::test]
async fn test_captured_payment_credits_wallet() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_customer(&conn, "cust_1");
    }
    let app = test_app(state.clone());

    // 50000 paise over a zero-balance customer.
    let body = captured_event_body("pay_1", "order_1", 50000, Some("cust_1"));
    let response = app.oneshot(signed_webhook_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], true);

    let conn = state.db.get().unwrap();
    let customer = queries::get_customer(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(customer.wallet_balance, 500, "50000 paise credit 500 rupees");

    let wallet = queries::get_wallet(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(wallet.balance, 500);

    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 1);
}

#[tokio::test]
async fn test_replayed_event_is_acknowledged_without_second_credit() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_customer(&conn, "cust_1");
    }
    let app = test_app(state.clone());

    let body = captured_event_body("pay_1", "order_1", 50000, Some("cust_1"));

    let first = app
        .clone()
        .oneshot(signed_webhook_request(body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Identical delivery again - hits the advisory cache.
    let second = app
        .clone()
        .oneshot(signed_webhook_request(body.clone()))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let json = response_json(second).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Event already processed");

    // Same delivery against a cold cache (restart / other instance) - the
    // durable constraint still refuses the second credit.
    let cold_state = AppState {
        db: state.db.clone(),
        razorpay_webhook_secret: state.razorpay_webhook_secret.clone(),
        razorpay_key_secret: state.razorpay_key_secret.clone(),
        event_cache: std::sync::Arc::new(EventCache::default()),
        forwarder: None,
    };
    let third = test_app(cold_state)
        .oneshot(signed_webhook_request(body))
        .await
        .unwrap();
    assert_eq!(third.status(), StatusCode::OK);
    let json = response_json(third).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Event already processed");

    let conn = state.db.get().unwrap();
    let customer = queries::get_customer(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(customer.wallet_balance, 500);
    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 1);
}

#[tokio::test]
async fn test_signature_over_different_bytes_is_rejected() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_customer(&conn, "cust_1");
    }
    let app = test_app(state.clone());

    // Signature computed over a different amount than the body carries.
    let signed_bytes = captured_event_body("pay_1", "order_1", 1, Some("cust_1"));
    let sent_body = captured_event_body("pay_1", "order_1", 50000, Some("cust_1"));
    let signature = sign_body(&signed_bytes, TEST_WEBHOOK_SECRET);

    let response = app
        .oneshot(webhook_request(sent_body, &signature))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);

    let conn = state.db.get().unwrap();
    let customer = queries::get_customer(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(customer.wallet_balance, 0);
    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 0);
}

#[tokio::test]
async fn test_missing_signature_header_is_rejected() {
    let state = create_test_app_state();
    let app = test_app(state);

    let body = captured_event_body("pay_1", "order_1", 50000, Some("cust_1"));
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/webhook/razorpay")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_secret_is_rejected() {
    let state = create_test_app_state();
    let app = test_app(state);

    let body = captured_event_body("pay_1", "order_1", 50000, Some("cust_1"));
    let signature = sign_body(&body, "not-the-webhook-secret");

    let response = app.oneshot(webhook_request(body, &signature)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_payload_with_valid_signature_is_rejected() {
    let state = create_test_app_state();
    let app = test_app(state);

    // Authentic bytes, but not a webhook event.
    let body = br#"{"event":"payment.captured"}"#.to_vec();
    let response = app.oneshot(signed_webhook_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_captured_event_without_customer_reference_is_a_no_op() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_customer(&conn, "cust_1");
    }
    let app = test_app(state.clone());

    let body = captured_event_body("pay_1", "order_1", 50000, None);
    let response = app.oneshot(signed_webhook_request(body)).await.unwrap();

    // Acknowledged so Razorpay stops resending, but nothing was settled.
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], true);

    let conn = state.db.get().unwrap();
    let customer = queries::get_customer(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(customer.wallet_balance, 0);
    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 0);
}

#[tokio::test]
async fn test_authorized_event_does_not_credit() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_customer(&conn, "cust_1");
    }
    let app = test_app(state.clone());

    let body = authorized_event_body("pay_1", "order_1", 50000, "cust_1");
    let response = app.oneshot(signed_webhook_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], true);

    // Crediting waits for the capture event.
    let conn = state.db.get().unwrap();
    let customer = queries::get_customer(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(customer.wallet_balance, 0);
    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 0);
}

#[tokio::test]
async fn test_unhandled_event_type_is_acknowledged() {
    let state = create_test_app_state();
    let app = test_app(state.clone());

    let body = serde_json::to_vec(&serde_json::json!({
        "event": "payment.pending",
        "payload": { "payment": { "entity": {
            "id": "pay_1", "order_id": "order_1",
            "amount": 50000, "status": "pending",
            "notes": { "customerId": "cust_1" }
        }}}
    }))
    .unwrap();

    let response = app.oneshot(signed_webhook_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let conn = state.db.get().unwrap();
    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_customer_is_acknowledged_with_failure_body() {
    let state = create_test_app_state();
    let app = test_app(state.clone());

    let body = captured_event_body("pay_1", "order_1", 50000, Some("cust_ghost"));
    let response = app.oneshot(signed_webhook_request(body)).await.unwrap();

    // 200 so the processor does not resend an event we can never settle;
    // the failure is visible in the body and in logs.
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);

    let conn = state.db.get().unwrap();
    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_deliveries_credit_once() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_customer(&conn, "cust_1");
    }

    let body = captured_event_body("pay_1", "order_1", 50000, Some("cust_1"));

    // Two identical in-flight deliveries; whichever interleaving occurs, at
    // most one may credit.
    let app_a = test_app(state.clone());
    let app_b = test_app(state.clone());
    let (resp_a, resp_b) = tokio::join!(
        app_a.oneshot(signed_webhook_request(body.clone())),
        app_b.oneshot(signed_webhook_request(body.clone())),
    );
    assert_eq!(resp_a.unwrap().status(), StatusCode::OK);
    assert_eq!(resp_b.unwrap().status(), StatusCode::OK);

    let conn = state.db.get().unwrap();
    let customer = queries::get_customer(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(customer.wallet_balance, 500);
    assert_eq!(queries::count_payment_transactions(&conn, "pay_1").unwrap(), 1);
}

#[tokio::test]
async fn test_amount_conversion_floors_partial_rupees() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_customer(&conn, "cust_1");
    }
    let app = test_app(state.clone());

    // 10050 paise = 100.50 rupees, floored to 100.
    let body = captured_event_body("pay_1", "order_1", 10050, Some("cust_1"));
    let response = app.oneshot(signed_webhook_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let conn = state.db.get().unwrap();
    let customer = queries::get_customer(&conn, "cust_1").unwrap().unwrap();
    assert_eq!(customer.wallet_balance, 100);
}
