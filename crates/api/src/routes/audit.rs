//! Audit trail routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use refund_core::audit::{AuditEntry, AuditFilter};
use refund_shared::AppError;
use refund_shared::types::{RefundId, TransactionId};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::response::ApiError;

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit", get(query_audit))
}

/// Query parameters for the audit trail. Both filters combine with OR.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Entries about this transaction.
    pub transaction_id: Option<String>,
    /// Entries about this refund.
    pub refund_id: Option<String>,
}

/// GET `/audit` - Audit entries in recording order.
async fn query_audit(
    State(state): State<AppState>,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let refund_id = query
        .refund_id
        .as_deref()
        .map(RefundId::from_str)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid refund_id".to_string()))?;

    let filter = AuditFilter {
        transaction_id: query.transaction_id.map(TransactionId::from),
        refund_id,
    };
    let trail = state.orchestrator.query_audit(filter);
    let entries: Vec<&AuditEntry> = trail.iter().collect();

    Ok((
        StatusCode::OK,
        Json(json!({
            "data": entries,
            "meta": {
                "timestamp": Utc::now(),
                "count": entries.len(),
            },
        })),
    )
        .into_response())
}
