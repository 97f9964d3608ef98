//! In-memory ledger store.
//!
//! The store is the single source of truth for transactions, their refundable
//! balances and the refunds issued against them. Each transaction lives behind
//! its own mutex so that refunds against different transactions never contend.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use serde::Serialize;
use refund_shared::types::{RefundId, TransactionId, round_money};

use super::error::LedgerError;
use super::refund::Refund;
use super::transaction::Transaction;
use crate::calculation::{CalculationError, RefundableBalance};

/// Shared handle to one transaction's ledger.
pub type LedgerHandle = Arc<Mutex<TransactionLedger>>;

/// A transaction together with its mutable refund state.
#[derive(Debug, Clone)]
pub struct TransactionLedger {
    transaction: Transaction,
    remaining: Decimal,
    refunds: Vec<Refund>,
}

impl TransactionLedger {
    /// Opens a ledger whose refundable balance starts at the transaction total.
    #[must_use]
    pub fn new(transaction: Transaction) -> Self {
        let remaining = round_money(transaction.total);
        Self {
            transaction,
            remaining,
            refunds: Vec::new(),
        }
    }

    #[must_use]
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Portion of the total not yet returned. Never negative, never increases.
    #[must_use]
    pub fn remaining_refundable_balance(&self) -> Decimal {
        self.remaining
    }

    /// Sum of all completed refunds.
    #[must_use]
    pub fn refunded_total(&self) -> Decimal {
        round_money(self.refunds.iter().map(|r| r.total_amount).sum())
    }

    /// Balance snapshot handed to the calculator.
    #[must_use]
    pub fn balance(&self) -> RefundableBalance {
        RefundableBalance {
            remaining: self.remaining,
            refunded: self.refunded_total(),
        }
    }

    /// Refunds in creation order.
    #[must_use]
    pub fn refunds(&self) -> &[Refund] {
        &self.refunds
    }

    /// The completed full refund, if one exists.
    #[must_use]
    pub fn completed_full_refund(&self) -> Option<&Refund> {
        self.refunds.iter().find(|r| r.is_full())
    }

    /// Read-only projection for query interfaces.
    #[must_use]
    pub fn view(&self) -> TransactionView {
        TransactionView {
            transaction: self.transaction.clone(),
            remaining_refundable_balance: self.remaining,
            refunded_total: self.refunded_total(),
            refund_count: self.refunds.len(),
        }
    }
}

/// Transaction as returned by query interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub remaining_refundable_balance: Decimal,
    pub refunded_total: Decimal,
    pub refund_count: usize,
}

/// Process-wide store of transactions and refunds.
#[derive(Debug, Default)]
pub struct LedgerStore {
    ledgers: DashMap<TransactionId, LedgerHandle>,
    refund_index: DashMap<RefundId, TransactionId>,
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a captured transaction.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTransaction` if the identifier is taken, or the
    /// violated invariant if the transaction is malformed.
    pub fn register_transaction(&self, transaction: Transaction) -> Result<(), LedgerError> {
        transaction.validate()?;
        match self.ledgers.entry(transaction.id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateTransaction(transaction.id)),
            Entry::Vacant(slot) => {
                tracing::debug!(transaction_id = %transaction.id, total = %transaction.total, "Transaction registered");
                slot.insert(Arc::new(Mutex::new(TransactionLedger::new(transaction))));
                Ok(())
            }
        }
    }

    /// Returns the lock handle for a transaction.
    ///
    /// The map guard is released before returning, so callers may hold the
    /// transaction lock without blocking the rest of the store.
    #[must_use]
    pub fn handle(&self, id: &TransactionId) -> Option<LedgerHandle> {
        self.ledgers.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered transactions.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.ledgers.len()
    }

    /// Looks up a transaction with its current balance.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a writer panicked while holding the lock.
    pub fn get_transaction(&self, id: &TransactionId) -> Result<Option<TransactionView>, LedgerError> {
        let Some(handle) = self.handle(id) else {
            return Ok(None);
        };
        let ledger = lock(&handle, id)?;
        Ok(Some(ledger.view()))
    }

    /// Lists all transactions ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a writer panicked while holding a lock.
    pub fn list_transactions(&self) -> Result<Vec<TransactionView>, LedgerError> {
        let mut views = self
            .snapshot_handles()
            .iter()
            .map(|(id, handle)| lock(handle, id).map(|ledger| ledger.view()))
            .collect::<Result<Vec<_>, _>>()?;
        views.sort_by(|a, b| a.transaction.id.cmp(&b.transaction.id));
        Ok(views)
    }

    /// Looks up a refund by identifier.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a writer panicked while holding the lock.
    pub fn get_refund(&self, id: &RefundId) -> Result<Option<Refund>, LedgerError> {
        let Some(transaction_id) = self.refund_index.get(id).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        let Some(handle) = self.handle(&transaction_id) else {
            return Ok(None);
        };
        let ledger = lock(&handle, &transaction_id)?;
        Ok(ledger.refunds().iter().find(|r| &r.id == id).cloned())
    }

    /// Lists refunds, optionally restricted to one transaction.
    ///
    /// Results are ordered by creation time, then identifier.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a writer panicked while holding a lock.
    pub fn list_refunds(&self, transaction_id: Option<&TransactionId>) -> Result<Vec<Refund>, LedgerError> {
        let handles = match transaction_id {
            Some(id) => self
                .handle(id)
                .map(|handle| vec![(id.clone(), handle)])
                .unwrap_or_default(),
            None => self.snapshot_handles(),
        };

        let mut refunds = Vec::new();
        for (id, handle) in &handles {
            refunds.extend(lock(handle, id)?.refunds().iter().cloned());
        }
        refunds.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(refunds)
    }

    /// Applies a refund to a locked ledger.
    ///
    /// The caller must hold the transaction's lock; `ledger` is the guarded value.
    ///
    /// # Errors
    ///
    /// Returns `NegativeBalance` if the refund exceeds the remaining balance.
    /// The ledger is left untouched in that case.
    pub fn commit_refund(&self, ledger: &mut TransactionLedger, refund: Refund) -> Result<(), CalculationError> {
        let remaining = ledger.remaining - refund.total_amount;
        if remaining.is_sign_negative() && !remaining.is_zero() {
            return Err(CalculationError::NegativeBalance {
                remaining: ledger.remaining,
                refund: refund.total_amount,
            });
        }

        ledger.remaining = round_money(remaining);
        self.refund_index.insert(refund.id, refund.transaction_id.clone());
        ledger.refunds.push(refund);
        Ok(())
    }

    fn snapshot_handles(&self) -> Vec<(TransactionId, LedgerHandle)> {
        self.ledgers
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }
}

fn lock<'a>(handle: &'a LedgerHandle, id: &TransactionId) -> Result<MutexGuard<'a, TransactionLedger>, LedgerError> {
    handle.lock().map_err(|_| LedgerError::LockPoisoned(id.clone()))
}
