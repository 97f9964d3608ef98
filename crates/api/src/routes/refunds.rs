//! Refund routes.
//!
//! `POST /refunds` is the only mutating endpoint of the service. Every other
//! route is a read-only query.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    response::Response,
    routing::get,
};
use refund_core::reconciliation::{ReconciliationResponse, RefundOutcome};
use refund_core::validation::RefundRequest;
use refund_shared::AppError;
use refund_shared::types::{PageRequest, RefundId, TransactionId};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use crate::response::{ApiError, envelope, error_response, ok, paged};

/// Request header carrying the idempotency key.
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";
/// Set on replayed responses.
pub const IDEMPOTENT_REPLAYED: &str = "idempotent-replayed";
/// Status code of the response being replayed.
pub const ORIGINAL_STATUS: &str = "x-original-status";

/// Creates the refund routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/refunds", get(list_refunds).post(create_refund))
        .route("/refunds/{refund_id}", get(get_refund))
}

/// Query parameters for listing refunds.
#[derive(Debug, Deserialize)]
pub struct ListRefundsQuery {
    /// Only refunds of this transaction.
    pub transaction_id: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// POST `/refunds` - Process a refund request.
async fn create_refund(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RefundRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(mut request) = payload?;

    if let Some(value) = headers.get(IDEMPOTENCY_KEY) {
        let key = value
            .to_str()
            .map_err(|_| AppError::Validation("Idempotency-Key must be visible ASCII".to_string()))?;
        request.idempotency_key = Some(key.to_string());
    }
    request.validate()?;

    let orchestrator = state.orchestrator.clone();
    let response = tokio::task::spawn_blocking(move || orchestrator.process(&request))
        .await
        .map_err(|e| AppError::Internal(format!("refund task failed: {e}")))?;

    Ok(render(&response))
}

/// Renders an orchestrator response; replays carry the stored body verbatim.
fn render(response: &ReconciliationResponse) -> Response {
    let mut rendered = match &response.outcome {
        RefundOutcome::Completed(refund) => {
            let status = StatusCode::from_u16(response.original_status).unwrap_or(StatusCode::CREATED);
            envelope(status, refund, response.recorded_at)
        }
        RefundOutcome::Rejected(rejection) => error_response(
            rejection.status,
            &rejection.code,
            &rejection.message,
            rejection.details.clone(),
        ),
    };

    if response.replayed {
        *rendered.status_mut() = StatusCode::OK;
        let headers = rendered.headers_mut();
        headers.insert(IDEMPOTENT_REPLAYED, HeaderValue::from_static("true"));
        headers.insert(ORIGINAL_STATUS, HeaderValue::from(response.original_status));
    }
    rendered
}

/// GET `/refunds/{refund_id}` - Get a single refund.
async fn get_refund(
    State(state): State<AppState>,
    Path(refund_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = RefundId::from_str(&refund_id)
        .map_err(|_| AppError::Validation(format!("Invalid refund id: {refund_id}")))?;

    match state.orchestrator.get_refund(&id)? {
        Some(refund) => Ok(ok(&refund)),
        None => Err(AppError::RefundNotFound(refund_id).into()),
    }
}

/// GET `/refunds` - List refunds, oldest first.
async fn list_refunds(
    State(state): State<AppState>,
    query: Result<Query<ListRefundsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let transaction_id = query.transaction_id.map(TransactionId::from);
    let refunds = state.orchestrator.list_refunds(transaction_id.as_ref())?;

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    Ok(paged(&page.paginate(refunds)))
}
