//! Refund reconciliation orchestrator.
//!
//! Per request the orchestrator walks these states:
//!
//! ```text
//! START -> IDEMPOTENCY_CHECK -> REPLAY_RETURN
//!                            -> VALIDATING -> REJECTED ----------------> AUDITING -> IDEMPOTENCY_FINALIZE -> DONE
//!                                          -> CALCULATING -> MUTATING -> AUDITING -> IDEMPOTENCY_FINALIZE -> DONE
//! ```
//!
//! Everything from the idempotency check to finalization runs while holding
//! the target transaction's lock, so same-transaction requests are serialized
//! and different transactions proceed in parallel.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use refund_shared::types::{RefundId, TransactionId};

use super::outcome::{ReconciliationResponse, RefundOutcome, Rejection};
use crate::audit::{AuditDraft, AuditFilter, AuditRecorder, AuditTrail};
use crate::idempotency::{IdempotencyBegin, IdempotencyStore};
use crate::ledger::{
    LedgerError, LedgerStore, Refund, RefundKind, RefundStatus, Transaction, TransactionLedger,
    TransactionView,
};
use crate::validation::{RefundError, RefundRequest, ValidationPipeline};

/// Entry point for refund requests and read-only queries.
///
/// All state is injected, so tests can run against isolated stores.
#[derive(Debug, Clone)]
pub struct RefundOrchestrator {
    ledger: Arc<LedgerStore>,
    idempotency: Arc<IdempotencyStore<RefundOutcome>>,
    audit: Arc<AuditRecorder>,
}

impl RefundOrchestrator {
    /// Builds an orchestrator over existing stores.
    #[must_use]
    pub fn new(
        ledger: Arc<LedgerStore>,
        idempotency: Arc<IdempotencyStore<RefundOutcome>>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            ledger,
            idempotency,
            audit,
        }
    }

    /// Builds an orchestrator over fresh, empty stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(LedgerStore::new()),
            Arc::new(IdempotencyStore::new()),
            Arc::new(AuditRecorder::new()),
        )
    }

    /// Processes a refund request.
    ///
    /// Never fails: every rejection, including internal faults, is returned as
    /// [`RefundOutcome::Rejected`] after being audited.
    pub fn process(&self, request: &RefundRequest) -> ReconciliationResponse {
        let handle = self.ledger.handle(&request.transaction_id);
        let mut guard = match handle.as_ref().map(|h| h.lock()) {
            None => None,
            Some(Ok(guard)) => Some(guard),
            Some(Err(_)) => {
                let fault = LedgerError::LockPoisoned(request.transaction_id.clone());
                return self.internal_fault(request, &fault);
            }
        };

        if let Some(key) = request.idempotency_key.as_deref() {
            match self.idempotency.begin(key) {
                IdempotencyBegin::New => {}
                IdempotencyBegin::Replay(stored) => {
                    info!(
                        transaction_id = %request.transaction_id,
                        idempotency_key = key,
                        original_status = stored.status,
                        "Idempotent replay"
                    );
                    return ReconciliationResponse::replay(stored);
                }
                IdempotencyBegin::InProgress => {
                    let error = RefundError::IdempotencyKeyInProgress(key.to_string());
                    return ReconciliationResponse::fresh(self.reject(request, &error));
                }
            }
        }

        let outcome = match self.reconcile(request, guard.as_deref_mut()) {
            Ok(refund) => {
                info!(
                    transaction_id = %refund.transaction_id,
                    refund_id = %refund.id,
                    amount = %refund.total_amount,
                    currency = %refund.currency,
                    "Refund completed"
                );
                self.audit.append(AuditDraft::refund_created(&refund));
                RefundOutcome::Completed(refund)
            }
            Err(error) => self.reject(request, &error),
        };

        let response = match request.idempotency_key.as_deref() {
            Some(key) if outcome.is_internal_error() => {
                self.idempotency.abandon(key);
                ReconciliationResponse::fresh(outcome)
            }
            Some(key) => {
                let stored = self.idempotency.finalize(key, outcome.status_code(), outcome);
                ReconciliationResponse::stored(stored)
            }
            None => ReconciliationResponse::fresh(outcome),
        };

        drop(guard);
        response
    }

    /// Validates, calculates and commits while the caller holds the lock.
    fn reconcile(
        &self,
        request: &RefundRequest,
        ledger: Option<&mut TransactionLedger>,
    ) -> Result<Refund, RefundError> {
        let approved = ValidationPipeline::run(request, ledger.as_deref())?;
        let Some(ledger) = ledger else {
            return Err(RefundError::Internal(format!(
                "approved refund without a ledger for {}",
                request.transaction_id
            )));
        };

        let breakdown = approved.breakdown;
        let refund = Refund {
            id: RefundId::new(),
            transaction_id: request.transaction_id.clone(),
            item_ids: approved.item_ids,
            kind: RefundKind::from(breakdown.scenario),
            status: RefundStatus::Completed,
            total_amount: breakdown.total_refund,
            currency: breakdown.currency.clone(),
            breakdown,
            operator_id: request.operator_id.clone(),
            reason: request.reason.clone(),
            idempotency_key: request.idempotency_key.clone(),
            created_at: Utc::now(),
        };

        self.ledger.commit_refund(ledger, refund.clone())?;
        Ok(refund)
    }

    /// Audits and renders a rejection.
    fn reject(&self, request: &RefundRequest, error: &RefundError) -> RefundOutcome {
        match error {
            RefundError::Internal(detail) => error!(
                transaction_id = %request.transaction_id,
                detail = %detail,
                "Refund failed with an internal error"
            ),
            _ => warn!(
                transaction_id = %request.transaction_id,
                error_code = error.error_code(),
                error = %error,
                "Refund rejected"
            ),
        }
        self.audit.append(AuditDraft::refund_rejected(request, error));
        RefundOutcome::Rejected(Rejection::from(error))
    }

    fn internal_fault(&self, request: &RefundRequest, fault: &LedgerError) -> ReconciliationResponse {
        let error = RefundError::Internal(fault.to_string());
        ReconciliationResponse::fresh(self.reject(request, &error))
    }

    /// Registers a captured transaction.
    ///
    /// # Errors
    ///
    /// Returns the [`LedgerError`] raised by the store.
    pub fn register_transaction(&self, transaction: Transaction) -> Result<(), LedgerError> {
        self.ledger.register_transaction(transaction)
    }

    /// Looks up a refund.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if the owning ledger is poisoned.
    pub fn get_refund(&self, id: &RefundId) -> Result<Option<Refund>, LedgerError> {
        self.ledger.get_refund(id)
    }

    /// Lists refunds, optionally for one transaction, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a ledger is poisoned.
    pub fn list_refunds(&self, transaction_id: Option<&TransactionId>) -> Result<Vec<Refund>, LedgerError> {
        self.ledger.list_refunds(transaction_id)
    }

    /// Looks up a transaction with its balance.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if the ledger is poisoned.
    pub fn get_transaction(&self, id: &TransactionId) -> Result<Option<TransactionView>, LedgerError> {
        self.ledger.get_transaction(id)
    }

    /// Lists all transactions by identifier.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a ledger is poisoned.
    pub fn list_transactions(&self) -> Result<Vec<TransactionView>, LedgerError> {
        self.ledger.list_transactions()
    }

    /// Number of registered transactions.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.ledger.transaction_count()
    }

    /// Snapshots the audit trail.
    #[must_use]
    pub fn query_audit(&self, filter: AuditFilter) -> AuditTrail {
        self.audit.query(filter)
    }
}
