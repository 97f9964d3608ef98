//! Router fixtures for route tests.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use refund_core::ledger::Transaction;
use refund_core::reconciliation::RefundOrchestrator;
use refund_shared::config::CorsConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, create_router};

/// Subtotal 80, tax 8, shipping 12, card 60 + wallet 40.
pub(crate) fn split_transaction() -> Transaction {
    serde_json::from_value(json!({
        "id": "TXN-SPLIT",
        "merchant_id": "MERCH-001",
        "status": "CAPTURED",
        "currency": "USD",
        "settlement_currency": "USD",
        "exchange_rate": "1",
        "subtotal": "80.00",
        "tax": "8.00",
        "shipping": "12.00",
        "total": "100.00",
        "payments": [
            { "id": "PAY-CARD", "method": "CARD", "amount": "60.00", "currency": "USD", "card_last4": "4242" },
            { "id": "PAY-WALLET", "method": "WALLET", "amount": "40.00", "currency": "USD" }
        ],
        "items": [
            { "id": "ITEM-A", "name": "Headphones", "unit_price": "50.00", "quantity": 1 },
            { "id": "ITEM-B", "name": "Case", "unit_price": "30.00", "quantity": 1 }
        ],
        "installments_total": 1,
        "installments_charged": 1
    }))
    .expect("valid transaction fixture")
}

/// Same shape as [`split_transaction`], but charged back.
pub(crate) fn chargebacked_transaction() -> Transaction {
    let mut tx = split_transaction();
    tx.id = "TXN-CHARGEBACK".into();
    tx.status = refund_core::ledger::TransactionStatus::Chargebacked;
    tx
}

pub(crate) fn test_app() -> Router {
    let orchestrator = RefundOrchestrator::in_memory();
    orchestrator.register_transaction(split_transaction()).unwrap();
    orchestrator.register_transaction(chargebacked_transaction()).unwrap();
    create_router(AppState::new(orchestrator), &CorsConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

pub(crate) async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

pub(crate) async fn post_refund(
    app: Router,
    body: &Value,
    idempotency_key: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/refunds")
        .header("Content-Type", "application/json");
    if let Some(key) = idempotency_key {
        builder = builder.header("Idempotency-Key", key);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}
