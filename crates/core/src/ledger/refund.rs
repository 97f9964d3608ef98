//! Completed refund record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use refund_shared::types::{CurrencyCode, ItemId, RefundId, TransactionId};

use crate::calculation::{CalculationBreakdown, RefundScenario};

/// Outcome status of a persisted refund.
///
/// Rejected requests never become refunds; they only exist in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Completed,
}

/// Kind of refund, derived from the request scope and transaction topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundKind {
    /// Everything that was still refundable.
    Full,
    /// A subset of items.
    Partial,
    /// The charged installments of an installment purchase.
    Installment,
}

impl From<RefundScenario> for RefundKind {
    fn from(scenario: RefundScenario) -> Self {
        match scenario {
            RefundScenario::FullSinglePayment | RefundScenario::FullSplitPayment => Self::Full,
            RefundScenario::PartialItems => Self::Partial,
            RefundScenario::Installment => Self::Installment,
        }
    }
}

/// A refund issued against a transaction. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub transaction_id: TransactionId,
    /// Items refunded; `None` for a full or installment refund.
    pub item_ids: Option<Vec<ItemId>>,
    pub kind: RefundKind,
    pub status: RefundStatus,
    /// Amount returned, in the purchase currency.
    pub total_amount: Decimal,
    pub currency: CurrencyCode,
    /// Allocation across payments, tax and shipping.
    pub breakdown: CalculationBreakdown,
    pub operator_id: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Refund {
    /// Returns true if this refund returned everything that was left.
    ///
    /// Installment refunds only cover the charged installments and do not count.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.kind == RefundKind::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_scenario() {
        assert_eq!(RefundKind::from(RefundScenario::FullSinglePayment), RefundKind::Full);
        assert_eq!(RefundKind::from(RefundScenario::FullSplitPayment), RefundKind::Full);
        assert_eq!(RefundKind::from(RefundScenario::PartialItems), RefundKind::Partial);
        assert_eq!(RefundKind::from(RefundScenario::Installment), RefundKind::Installment);
    }

    #[test]
    fn test_kind_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&RefundKind::Installment).unwrap(), "\"INSTALLMENT\"");
        assert_eq!(serde_json::to_string(&RefundStatus::Completed).unwrap(), "\"COMPLETED\"");
    }
}
