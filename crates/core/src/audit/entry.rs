//! Audit entry types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use refund_shared::types::{AuditEntryId, CurrencyCode, RefundId, TransactionId};

use crate::calculation::{CalculationBreakdown, RefundScenario};
use crate::ledger::Refund;
use crate::validation::{RefundError, RefundRequest};

/// What was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    RefundCreated,
    RefundRejected,
}

/// Immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    /// Position in the trail, starting at 1.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub transaction_id: TransactionId,
    /// Set for created refunds only.
    pub refund_id: Option<RefundId>,
    pub operator_id: String,
    /// Reason given by the operator.
    pub reason: String,
    /// Rejection code, for rejected requests.
    pub error_code: Option<String>,
    /// Human-readable explanation of the decision.
    pub message: String,
    pub amount: Option<Decimal>,
    pub currency: Option<CurrencyCode>,
    pub idempotency_key: Option<String>,
    /// Calculation snapshot, for created refunds.
    pub calculation: Option<CalculationBreakdown>,
}

/// Everything an entry carries except what the recorder assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditDraft {
    pub action: AuditAction,
    pub transaction_id: TransactionId,
    pub refund_id: Option<RefundId>,
    pub operator_id: String,
    pub reason: String,
    pub error_code: Option<String>,
    pub message: String,
    pub amount: Option<Decimal>,
    pub currency: Option<CurrencyCode>,
    pub idempotency_key: Option<String>,
    pub calculation: Option<CalculationBreakdown>,
}

impl AuditDraft {
    /// Draft for a completed refund.
    #[must_use]
    pub fn refund_created(refund: &Refund) -> Self {
        Self {
            action: AuditAction::RefundCreated,
            transaction_id: refund.transaction_id.clone(),
            refund_id: Some(refund.id),
            operator_id: refund.operator_id.clone(),
            reason: refund.reason.clone(),
            error_code: None,
            message: approval_message(refund),
            amount: Some(refund.total_amount),
            currency: Some(refund.currency.clone()),
            idempotency_key: refund.idempotency_key.clone(),
            calculation: Some(refund.breakdown.clone()),
        }
    }

    /// Draft for a rejected request.
    #[must_use]
    pub fn refund_rejected(request: &RefundRequest, error: &RefundError) -> Self {
        Self {
            action: AuditAction::RefundRejected,
            transaction_id: request.transaction_id.clone(),
            refund_id: None,
            operator_id: request.operator_id.clone(),
            reason: request.reason.clone(),
            error_code: Some(error.error_code().to_string()),
            message: format!("Refund rejected. Code: {}. Reason: {error}", error.error_code()),
            amount: None,
            currency: None,
            idempotency_key: request.idempotency_key.clone(),
            calculation: None,
        }
    }
}

fn approval_message(refund: &Refund) -> String {
    let bd = &refund.breakdown;
    let currency = &refund.currency;
    let mut parts = Vec::new();

    match bd.scenario {
        RefundScenario::PartialItems => {
            let subtotal = bd.items_subtotal.unwrap_or_default();
            parts.push(format!(
                "Partial refund approved for items totalling {subtotal} {currency}. Item ratio: {}.",
                bd.item_ratio.unwrap_or_default()
            ));
            parts.push(format!("Proportional tax: {} {currency}.", bd.tax_refund));
            parts.push(format!("Proportional shipping: {} {currency}.", bd.shipping_refund));
        }
        RefundScenario::Installment => {
            if let Some(inst) = &bd.installments {
                parts.push(format!(
                    "Installment refund approved. {} of {} installments charged. \
                     Installment value: {} {currency}. Charged amount: {} {currency}.",
                    inst.installments_charged,
                    inst.installments_total,
                    inst.installment_value,
                    inst.charged_amount
                ));
            }
        }
        RefundScenario::FullSinglePayment | RefundScenario::FullSplitPayment => {
            parts.push(format!("Full refund approved for transaction {}.", refund.transaction_id));
        }
    }

    parts.push(format!("Total refund: {} {currency}.", refund.total_amount));

    let distribution: Vec<String> = bd
        .payment_breakdown
        .iter()
        .map(|p| format!("{} {} {}", p.payment_id, p.refund_amount, p.currency))
        .collect();
    if !distribution.is_empty() {
        parts.push(format!("Distribution: {}.", distribution.join(", ")));
    }

    if let Some(settlement) = &bd.settlement {
        parts.push(format!(
            "Settlement: {} {} (exchange rate: {}).",
            settlement.amount, settlement.currency, settlement.exchange_rate
        ));
    }

    parts.join(" ")
}
