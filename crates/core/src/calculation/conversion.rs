//! Settlement currency conversion.
//!
//! Conversions always use the rate captured on the transaction at purchase
//! time. There is no live rate lookup.

use rust_decimal::Decimal;
use refund_shared::types::round_money;

use super::error::CalculationError;

/// Converts an amount using the given exchange rate, rounding half-up to cents.
///
/// # Errors
///
/// Returns `NonPositiveExchangeRate` if the rate is zero or negative.
pub fn convert_amount(amount: Decimal, rate: Decimal) -> Result<Decimal, CalculationError> {
    if rate <= Decimal::ZERO {
        return Err(CalculationError::NonPositiveExchangeRate(rate));
    }
    Ok(round_money(amount * rate))
}
