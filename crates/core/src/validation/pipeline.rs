//! Ordered admissibility checks for refund requests.
//!
//! Checks run in a fixed order and stop at the first failure. The pipeline
//! only reads the ledger; it never mutates it.

use std::collections::HashSet;

use rust_decimal::Decimal;
use refund_shared::types::ItemId;

use super::error::RefundError;
use super::request::RefundRequest;
use crate::calculation::{CalculationBreakdown, RefundCalculator, RefundScope};
use crate::ledger::{Transaction, TransactionLedger};

/// A request that passed every check, with its computed allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedRefund {
    /// Items being refunded; `None` for a full refund.
    pub item_ids: Option<Vec<ItemId>>,
    pub breakdown: CalculationBreakdown,
}

/// Stateless validation pipeline.
pub struct ValidationPipeline;

impl ValidationPipeline {
    /// Runs every check against the locked ledger of the target transaction.
    ///
    /// Order:
    /// 1. Transaction exists
    /// 2. Status is CAPTURED or SETTLED
    /// 3. Requested items exist (an empty list is rejected, duplicates collapse)
    /// 4. No completed full refund exists, for full refunds
    /// 5. Dry-run amount fits in the remaining balance
    /// 6. At least one installment is charged, for installment purchases
    /// 7. The amount is not zero
    ///
    /// Arithmetic guards inside the dry-run surface as `CALCULATION_ERROR`.
    ///
    /// # Errors
    ///
    /// Returns the [`RefundError`] of the first failing check.
    pub fn run(
        request: &RefundRequest,
        ledger: Option<&TransactionLedger>,
    ) -> Result<ApprovedRefund, RefundError> {
        let ledger =
            ledger.ok_or_else(|| RefundError::TransactionNotFound(request.transaction_id.clone()))?;
        let transaction = ledger.transaction();

        Self::check_status(transaction)?;

        let scope = Self::resolve_scope(transaction, request.item_ids.as_deref())?;

        if scope.is_full()
            && let Some(existing) = ledger.completed_full_refund()
        {
            return Err(RefundError::DuplicateRefund {
                transaction_id: transaction.id.clone(),
                existing_refund_id: existing.id,
            });
        }

        let breakdown = RefundCalculator::calculate(transaction, &scope, ledger.balance())?;
        let remaining = ledger.remaining_refundable_balance();
        if remaining <= Decimal::ZERO || breakdown.total_refund > remaining {
            return Err(RefundError::RefundAmountExceeded {
                transaction_id: transaction.id.clone(),
                requested: breakdown.total_refund,
                remaining,
            });
        }

        if transaction.is_installment() && transaction.installments_charged == 0 {
            return Err(RefundError::InstallmentNotCharged {
                transaction_id: transaction.id.clone(),
                installments_total: transaction.installments_total,
            });
        }

        // Everything charged has already been returned
        if breakdown.total_refund.is_zero() {
            return Err(RefundError::RefundAmountExceeded {
                transaction_id: transaction.id.clone(),
                requested: breakdown.total_refund,
                remaining,
            });
        }

        let item_ids = match scope {
            RefundScope::Full => None,
            RefundScope::Items(items) => Some(items.iter().map(|item| item.id.clone()).collect()),
        };

        Ok(ApprovedRefund { item_ids, breakdown })
    }

    fn check_status(transaction: &Transaction) -> Result<(), RefundError> {
        if transaction.status.allows_refund() {
            Ok(())
        } else {
            Err(RefundError::InvalidTransactionStatus {
                transaction_id: transaction.id.clone(),
                status: transaction.status,
            })
        }
    }

    /// Resolves requested ids into items. A list naming every item is a full refund.
    fn resolve_scope<'a>(
        transaction: &'a Transaction,
        item_ids: Option<&[ItemId]>,
    ) -> Result<RefundScope<'a>, RefundError> {
        let Some(item_ids) = item_ids else {
            return Ok(RefundScope::Full);
        };

        let valid_item_ids = || transaction.items.iter().map(|item| item.id.clone()).collect();

        if item_ids.is_empty() {
            return Err(RefundError::InvalidItemIds {
                transaction_id: transaction.id.clone(),
                unknown_item_ids: vec![],
                valid_item_ids: valid_item_ids(),
            });
        }

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        let mut unknown = Vec::new();
        for id in item_ids.iter().filter(|id| seen.insert(*id)) {
            match transaction.item(id) {
                Some(item) => items.push(item),
                None => unknown.push(id.clone()),
            }
        }

        if !unknown.is_empty() {
            return Err(RefundError::InvalidItemIds {
                transaction_id: transaction.id.clone(),
                unknown_item_ids: unknown,
                valid_item_ids: valid_item_ids(),
            });
        }

        if items.len() == transaction.items.len() {
            return Ok(RefundScope::Full);
        }
        Ok(RefundScope::Items(items))
    }
}
