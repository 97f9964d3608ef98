//! Response envelopes.
//!
//! Successful bodies are `{"data": ..., "meta": {"timestamp": ...}}`; errors
//! are `{"error": {"code", "message", "details"}}`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use refund_core::ledger::LedgerError;
use refund_shared::AppError;
use refund_shared::types::PageResponse;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;
use validator::ValidationErrors;

/// Wraps `data` in the success envelope.
pub fn envelope<T: Serialize>(status: StatusCode, data: &T, timestamp: DateTime<Utc>) -> Response {
    (
        status,
        Json(json!({
            "data": data,
            "meta": { "timestamp": timestamp },
        })),
    )
        .into_response()
}

/// Success envelope stamped with the current time.
pub fn ok<T: Serialize>(data: &T) -> Response {
    envelope(StatusCode::OK, data, Utc::now())
}

/// Success envelope for one page of a list.
pub fn paged<T: Serialize>(page: &PageResponse<T>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "data": page.data,
            "meta": {
                "timestamp": Utc::now(),
                "pagination": page.meta,
            },
        })),
    )
        .into_response()
}

/// Renders an error body.
pub fn error_response(status: u16, code: &str, message: &str, details: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": {
                "code": code,
                "message": message,
                "details": details,
            }
        })),
    )
        .into_response()
}

/// Renders an application error. Internal detail is logged, not returned.
pub fn app_error(err: &AppError) -> Response {
    if let AppError::Internal(detail) = err {
        error!(detail = %detail, "Request failed with an internal error");
    }
    error_response(err.status_code(), err.error_code(), &err.to_string(), json!({}))
}

/// Handler error that renders through [`app_error`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        app_error(&self.0)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(AppError::Internal(err.to_string()))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, problems)| {
                let reasons: Vec<String> = problems
                    .iter()
                    .map(|p| {
                        p.message
                            .as_ref()
                            .map_or_else(|| p.code.to_string(), ToString::to_string)
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        Self(AppError::Validation(fields.join("; ")))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}
