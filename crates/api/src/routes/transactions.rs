//! Transaction lookup routes.

use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Response,
    routing::get,
};
use refund_shared::AppError;
use refund_shared::types::{PageRequest, TransactionId};

use crate::AppState;
use crate::response::{ApiError, ok, paged};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/{transaction_id}", get(get_transaction))
}

/// GET `/transactions/{transaction_id}` - Transaction with its refundable balance.
async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = TransactionId::from(transaction_id);
    match state.orchestrator.get_transaction(&id)? {
        Some(view) => Ok(ok(&view)),
        None => Err(AppError::TransactionNotFound(id.to_string()).into()),
    }
}

/// GET `/transactions` - List transactions by identifier.
async fn list_transactions(
    State(state): State<AppState>,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(page) = page?;
    let transactions = state.orchestrator.list_transactions()?;
    Ok(paged(&page.paginate(transactions)))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, post_refund, test_app};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_balance_reflects_refunds() {
        let app = test_app();
        let (_, before) = get(app.clone(), "/api/v1/transactions/TXN-SPLIT").await;
        assert_eq!(before["data"]["remaining_refundable_balance"], "100.00");
        assert_eq!(before["data"]["refund_count"], 0);

        let request = json!({
            "transaction_id": "TXN-SPLIT",
            "item_ids": ["ITEM-A"],
            "operator_id": "op_1",
            "reason": "Wrong size",
        });
        post_refund(app.clone(), &request, None).await;

        let (status, after) = get(app, "/api/v1/transactions/TXN-SPLIT").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["data"]["remaining_refundable_balance"], "37.50");
        assert_eq!(after["data"]["refunded_total"], "62.50");
        assert_eq!(after["data"]["refund_count"], 1);
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let (status, body) = get(test_app(), "/api/v1/transactions/TXN-NOPE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "TRANSACTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_is_paginated() {
        let (status, body) = get(test_app(), "/api/v1/transactions?page=1&per_page=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "TXN-CHARGEBACK");
        assert_eq!(body["meta"]["pagination"]["total"], 2);
        assert_eq!(body["meta"]["pagination"]["total_pages"], 2);
    }
}
