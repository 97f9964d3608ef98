//! Ledger error types for transaction registration and store access.
//!
//! Refund decisions have their own taxonomy in `validation::RefundError`;
//! the errors here only concern the integrity of the store itself.

use rust_decimal::Decimal;
use thiserror::Error;
use refund_shared::types::{ItemId, TransactionId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Registration Errors ==========
    /// A transaction with the same identifier is already registered.
    #[error("Transaction {0} is already registered")]
    DuplicateTransaction(TransactionId),

    /// Transaction has no payments.
    #[error("Transaction {0} has no payments")]
    NoPayments(TransactionId),

    /// An amount that must be positive is not.
    #[error("Amount must be positive: {field}")]
    NonPositiveAmount {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Payments do not add up to the transaction total.
    #[error("Payments sum to {payments} but the transaction total is {total}")]
    PaymentsDoNotMatchTotal {
        /// Sum of payment amounts.
        payments: Decimal,
        /// Declared transaction total.
        total: Decimal,
    },

    /// Item amounts exceed the subtotal.
    #[error("Items sum to {items} which exceeds the subtotal {subtotal}")]
    ItemsExceedSubtotal {
        /// Sum of item amounts.
        items: Decimal,
        /// Declared subtotal.
        subtotal: Decimal,
    },

    /// The same item identifier appears twice.
    #[error("Item {0} appears more than once")]
    DuplicateItem(ItemId),

    /// Installment counters are inconsistent.
    #[error("Invalid installments: {charged} charged of {total}")]
    InvalidInstallments {
        /// Total installments.
        total: u32,
        /// Installments charged.
        charged: u32,
    },

    /// Exchange rate must be positive.
    #[error("Exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),

    // ========== Concurrency Errors ==========
    /// A thread panicked while holding the transaction lock.
    #[error("Ledger lock poisoned for transaction {0}")]
    LockPoisoned(TransactionId),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
            Self::NoPayments(_) => "NO_PAYMENTS",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::PaymentsDoNotMatchTotal { .. } => "PAYMENTS_DO_NOT_MATCH_TOTAL",
            Self::ItemsExceedSubtotal { .. } => "ITEMS_EXCEED_SUBTOTAL",
            Self::DuplicateItem(_) => "DUPLICATE_ITEM",
            Self::InvalidInstallments { .. } => "INVALID_INSTALLMENTS",
            Self::InvalidExchangeRate(_) => "INVALID_EXCHANGE_RATE",
            Self::LockPoisoned(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 409 Conflict
            Self::DuplicateTransaction(_) => 409,

            // 500 Internal Server Error
            Self::LockPoisoned(_) => 500,

            // 400 Bad Request - registration invariants
            _ => 400,
        }
    }
}
