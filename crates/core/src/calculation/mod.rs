//! Refund calculation engine.
//!
//! This module provides:
//! - Proportional allocation with exact reconciliation (Largest Remainder Method)
//! - Settlement currency conversion at the purchase-time rate
//! - The refund calculator for full, split, partial and installment refunds

pub mod allocation;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use allocation::AllocationUtil;
pub use conversion::convert_amount;
pub use engine::RefundCalculator;
pub use error::CalculationError;
pub use types::{
    CalculationBreakdown, InstallmentDetail, PaymentRefund, RefundScenario, RefundScope,
    RefundableBalance, SettlementConversion,
};
