//! Decimal money helpers and currency codes.
//!
//! CRITICAL: Never use floating-point for money calculations.
//!
//! Rounding rule for every monetary figure this service returns:
//! 2 fractional digits, half-up, applied once at the output boundary.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of fractional digits of every returned monetary figure.
pub const MONEY_SCALE: u32 = 2;

/// Rounds to [`MONEY_SCALE`] digits, half-up, padding the scale so that
/// `60` renders as `60.00`.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// The smallest representable monetary unit (one cent).
#[must_use]
pub fn money_unit() -> Decimal {
    Decimal::new(1, MONEY_SCALE)
}

/// ISO 4217 currency code (three uppercase ASCII letters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.len() == 3 && upper.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(upper))
        } else {
            Err(format!("Unknown currency: {s}"))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[rstest]
    #[case(dec!(3.125), dec!(3.13))]
    #[case(dec!(3.124), dec!(3.12))]
    #[case(dec!(0.005), dec!(0.01))]
    #[case(dec!(2.675), dec!(2.68))]
    #[case(dec!(-3.125), dec!(-3.13))]
    #[case(dec!(100), dec!(100.00))]
    fn test_round_money_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_round_money_pads_scale() {
        assert_eq!(round_money(dec!(60)).to_string(), "60.00");
        assert_eq!(round_money(dec!(58.125)).to_string(), "58.13");
    }

    #[test]
    fn test_money_unit() {
        assert_eq!(money_unit(), dec!(0.01));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(CurrencyCode::from_str("brl").unwrap().as_str(), "BRL");
        assert_eq!(CurrencyCode::from_str("USD").unwrap().as_str(), "USD");
        assert!(CurrencyCode::from_str("US").is_err());
        assert!(CurrencyCode::from_str("U5D").is_err());
        assert!(CurrencyCode::from_str("").is_err());
    }

    #[test]
    fn test_currency_serde_rejects_invalid() {
        let ok: CurrencyCode = serde_json::from_str("\"mxn\"").unwrap();
        assert_eq!(ok.as_str(), "MXN");
        assert!(serde_json::from_str::<CurrencyCode>("\"DOLLARS\"").is_err());
    }
}
