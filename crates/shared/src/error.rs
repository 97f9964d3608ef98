//! Application-wide error types.
//!
//! Refund decisions have their own taxonomy in `refund-core`; this type
//! covers everything around them (lookups, malformed input, faults).

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Transaction lookup failed.
    #[error("Transaction {0} not found")]
    TransactionNotFound(String),

    /// Refund lookup failed.
    #[error("Refund {0} not found")]
    RefundNotFound(String),

    /// Malformed or out-of-range request input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server error. The detail is for logs only.
    #[error("An internal error occurred")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::TransactionNotFound(_) | Self::RefundNotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::RefundNotFound(_) => "REFUND_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
