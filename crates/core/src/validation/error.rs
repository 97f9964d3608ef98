//! Refund decision error taxonomy.
//!
//! Every rejection the engine can produce is one variant here. The HTTP layer
//! renders `error_code()`, `http_status_code()`, `Display` and `details()`.

use rust_decimal::Decimal;
use serde_json::{Value, json};
use thiserror::Error;
use refund_shared::types::{ItemId, RefundId, TransactionId};

use crate::calculation::CalculationError;
use crate::ledger::TransactionStatus;

/// Errors that reject a refund request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefundError {
    // ========== Admissibility Errors ==========
    /// Transaction does not exist.
    #[error("Transaction {0} not found")]
    TransactionNotFound(TransactionId),

    /// Transaction status does not allow refunds.
    #[error("{}", status_message(.transaction_id, .status))]
    InvalidTransactionStatus {
        /// Transaction being refunded.
        transaction_id: TransactionId,
        /// Disallowed status.
        status: TransactionStatus,
    },

    /// Some requested items are not part of the transaction.
    #[error("{}", item_ids_message(.transaction_id, .unknown_item_ids))]
    InvalidItemIds {
        /// Transaction being refunded.
        transaction_id: TransactionId,
        /// Requested items that were not found. Empty when no items were given.
        unknown_item_ids: Vec<ItemId>,
        /// Items the transaction does contain.
        valid_item_ids: Vec<ItemId>,
    },

    /// A full refund was already completed.
    #[error("A full refund already exists for transaction {transaction_id}")]
    DuplicateRefund {
        /// Transaction being refunded.
        transaction_id: TransactionId,
        /// The completed full refund.
        existing_refund_id: RefundId,
    },

    /// Requested amount exceeds what is left.
    #[error("Refund of {requested} exceeds the remaining refundable balance of {remaining}")]
    RefundAmountExceeded {
        /// Transaction being refunded.
        transaction_id: TransactionId,
        /// Computed refund amount.
        requested: Decimal,
        /// Remaining refundable balance.
        remaining: Decimal,
    },

    /// No installment has been charged yet.
    #[error("No installments have been charged yet for transaction {transaction_id}. Cannot refund uncharged installments.")]
    InstallmentNotCharged {
        /// Transaction being refunded.
        transaction_id: TransactionId,
        /// Installments the purchase was split into.
        installments_total: u32,
    },

    // ========== Arithmetic Guard Errors ==========
    /// A calculation guard tripped.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    // ========== Concurrency Errors ==========
    /// Another request holding the same idempotency key has not finished.
    #[error("A request with idempotency key {0} is still being processed")]
    IdempotencyKeyInProgress(String),

    // ========== Internal Errors ==========
    /// Unexpected fault. The detail is logged, never rendered.
    #[error("An internal error occurred")]
    Internal(String),
}

fn status_message(transaction_id: &TransactionId, status: &TransactionStatus) -> String {
    match *status {
        TransactionStatus::Chargebacked => format!(
            "Transaction {transaction_id} cannot be refunded: status is CHARGEBACKED. \
             Chargebacks are handled by the disputes process, not this service."
        ),
        TransactionStatus::Voided => format!(
            "Transaction {transaction_id} cannot be refunded: status is VOIDED. \
             Use void/cancel operations for pre-capture reversals."
        ),
        TransactionStatus::Authorized => format!(
            "Transaction {transaction_id} is authorized but not yet captured. Use void/cancel instead."
        ),
        other => format!("Transaction {transaction_id} has status {other}, which does not allow refunds."),
    }
}

fn item_ids_message(transaction_id: &TransactionId, unknown: &[ItemId]) -> String {
    if unknown.is_empty() {
        return format!("No item IDs were given for transaction {transaction_id}");
    }
    let ids: Vec<&str> = unknown.iter().map(ItemId::as_str).collect();
    format!(
        "The following item IDs were not found in transaction {transaction_id}: {}",
        ids.join(", ")
    )
}

impl RefundError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InvalidTransactionStatus { .. } => "INVALID_TRANSACTION_STATUS",
            Self::InvalidItemIds { .. } => "INVALID_ITEM_IDS",
            Self::DuplicateRefund { .. } => "DUPLICATE_REFUND",
            Self::RefundAmountExceeded { .. } => "REFUND_AMOUNT_EXCEEDED",
            Self::InstallmentNotCharged { .. } => "INSTALLMENT_NOT_CHARGED",
            Self::Calculation(e) => e.error_code(),
            Self::IdempotencyKeyInProgress(_) => "IDEMPOTENCY_KEY_IN_PROGRESS",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 404 Not Found
            Self::TransactionNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateRefund { .. } | Self::IdempotencyKeyInProgress(_) => 409,

            // 422 Unprocessable Entity - business rule violations
            Self::InvalidTransactionStatus { .. }
            | Self::InvalidItemIds { .. }
            | Self::RefundAmountExceeded { .. }
            | Self::InstallmentNotCharged { .. } => 422,
            Self::Calculation(e) => e.http_status_code(),

            // 500 Internal Server Error
            Self::Internal(_) => 500,
        }
    }

    /// Structured context for the rejection payload. Never includes internal detail.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::TransactionNotFound(id) => json!({ "transaction_id": id }),
            Self::InvalidTransactionStatus { status, .. } => json!({ "status": status }),
            Self::InvalidItemIds {
                unknown_item_ids,
                valid_item_ids,
                ..
            } => json!({
                "unknown_item_ids": unknown_item_ids,
                "valid_item_ids": valid_item_ids,
            }),
            Self::DuplicateRefund { existing_refund_id, .. } => {
                json!({ "existing_refund_id": existing_refund_id })
            }
            Self::RefundAmountExceeded {
                requested, remaining, ..
            } => json!({
                "requested_amount": requested,
                "remaining_refundable": remaining,
            }),
            Self::InstallmentNotCharged {
                installments_total, ..
            } => json!({
                "installments_total": installments_total,
                "installments_charged": 0,
            }),
            Self::Calculation(_) | Self::IdempotencyKeyInProgress(_) | Self::Internal(_) => json!({}),
        }
    }
}
