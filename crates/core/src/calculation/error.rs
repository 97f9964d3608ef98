//! Arithmetic guard errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Raised when a calculation would divide by zero or break reconciliation.
///
/// These are request-level rejections, not process faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    /// Transaction total is zero, so payment weights are undefined.
    #[error("Cannot distribute refund: transaction total is zero")]
    ZeroTransactionTotal,

    /// Subtotal is zero, so the item ratio is undefined.
    #[error("Cannot calculate item ratio: transaction subtotal is zero")]
    ZeroSubtotal,

    /// Installment count is zero.
    #[error("Installment total count cannot be zero")]
    ZeroInstallments,

    /// Exchange rate is zero or negative.
    #[error("Cannot convert currency: exchange rate {0} is not positive")]
    NonPositiveExchangeRate(Decimal),

    /// There is no payment to allocate to.
    #[error("Cannot distribute refund: transaction has no payments")]
    NoPayments,

    /// Applying the refund would drive the balance below zero.
    #[error("Refund of {refund} would leave a negative balance (remaining {remaining})")]
    NegativeBalance {
        /// Balance before the refund.
        remaining: Decimal,
        /// Refund amount.
        refund: Decimal,
    },
}

impl CalculationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "CALCULATION_ERROR"
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        422
    }
}
