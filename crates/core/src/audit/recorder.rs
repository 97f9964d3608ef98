//! Append-only audit recorder.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use refund_shared::types::{AuditEntryId, RefundId, TransactionId};

use super::entry::{AuditDraft, AuditEntry};

/// Selects entries by transaction or refund.
///
/// Both filters combine with OR; no filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub transaction_id: Option<TransactionId>,
    pub refund_id: Option<RefundId>,
}

impl AuditFilter {
    /// Entries for one transaction.
    #[must_use]
    pub fn transaction(id: TransactionId) -> Self {
        Self {
            transaction_id: Some(id),
            refund_id: None,
        }
    }

    /// Entries for one refund.
    #[must_use]
    pub fn refund(id: RefundId) -> Self {
        Self {
            transaction_id: None,
            refund_id: Some(id),
        }
    }

    /// Returns true if `entry` is selected.
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        match (&self.transaction_id, &self.refund_id) {
            (None, None) => true,
            (transaction_id, refund_id) => {
                transaction_id.as_ref() == Some(&entry.transaction_id)
                    || (refund_id.is_some() && *refund_id == entry.refund_id)
            }
        }
    }
}

/// Point-in-time view of the trail.
///
/// Entries appended after the query are not visible. Iterating is lazy and
/// can be restarted any number of times.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    entries: Vec<Arc<AuditEntry>>,
    filter: AuditFilter,
}

impl AuditTrail {
    /// Iterates matching entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> + '_ {
        self.entries
            .iter()
            .map(|entry| &**entry)
            .filter(|entry| self.filter.matches(entry))
    }

    /// Number of matching entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

impl<'a> IntoIterator for &'a AuditTrail {
    type Item = &'a AuditEntry;
    type IntoIter = Box<dyn Iterator<Item = &'a AuditEntry> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Ordered, append-only sequence of audit entries.
#[derive(Debug, Default)]
pub struct AuditRecorder {
    entries: RwLock<Vec<Arc<AuditEntry>>>,
}

impl AuditRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, assigning its id, sequence number and timestamp.
    pub fn append(&self, draft: AuditDraft) -> Arc<AuditEntry> {
        // Entries are only ever pushed, so a poisoned vector is still consistent
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = Arc::new(AuditEntry {
            id: AuditEntryId::new(),
            sequence: u64::try_from(entries.len()).unwrap_or(u64::MAX).saturating_add(1),
            timestamp: Utc::now(),
            action: draft.action,
            transaction_id: draft.transaction_id,
            refund_id: draft.refund_id,
            operator_id: draft.operator_id,
            reason: draft.reason,
            error_code: draft.error_code,
            message: draft.message,
            amount: draft.amount,
            currency: draft.currency,
            idempotency_key: draft.idempotency_key,
            calculation: draft.calculation,
        });
        entries.push(Arc::clone(&entry));
        entry
    }

    /// Snapshots the entries selected by `filter`.
    #[must_use]
    pub fn query(&self, filter: AuditFilter) -> AuditTrail {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner).clone();
        AuditTrail { entries, filter }
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::AuditAction;
    use crate::validation::{RefundError, RefundRequest};

    fn rejection(transaction_id: &str) -> AuditDraft {
        let request = RefundRequest {
            transaction_id: TransactionId::from(transaction_id),
            item_ids: None,
            operator_id: "op-1".to_string(),
            reason: "test".to_string(),
            idempotency_key: None,
        };
        let error = RefundError::TransactionNotFound(request.transaction_id.clone());
        AuditDraft::refund_rejected(&request, &error)
    }

    #[test]
    fn test_append_assigns_sequence() {
        let recorder = AuditRecorder::new();
        let first = recorder.append(rejection("TXN-1"));
        let second = recorder.append(rejection("TXN-2"));

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(first.action, AuditAction::RefundRejected);
        assert_eq!(first.error_code.as_deref(), Some("TRANSACTION_NOT_FOUND"));
        assert_eq!(
            first.message,
            "Refund rejected. Code: TRANSACTION_NOT_FOUND. Reason: Transaction TXN-1 not found"
        );
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_query_filters_with_or() {
        let recorder = AuditRecorder::new();
        recorder.append(rejection("TXN-1"));
        recorder.append(rejection("TXN-2"));
        let mut created = rejection("TXN-3");
        let refund_id = RefundId::new();
        created.action = AuditAction::RefundCreated;
        created.refund_id = Some(refund_id);
        recorder.append(created);

        assert_eq!(recorder.query(AuditFilter::default()).count(), 3);
        assert_eq!(recorder.query(AuditFilter::transaction("TXN-2".into())).count(), 1);
        assert_eq!(recorder.query(AuditFilter::refund(refund_id)).count(), 1);

        let either = AuditFilter {
            transaction_id: Some("TXN-1".into()),
            refund_id: Some(refund_id),
        };
        let sequences: Vec<u64> = recorder.query(either).iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 3]);
    }

    #[test]
    fn test_refund_filter_skips_rejections() {
        let recorder = AuditRecorder::new();
        recorder.append(rejection("TXN-1"));
        assert_eq!(recorder.query(AuditFilter::refund(RefundId::new())).count(), 0);
    }

    #[test]
    fn test_trail_is_snapshot_and_restartable() {
        let recorder = AuditRecorder::new();
        recorder.append(rejection("TXN-1"));
        let trail = recorder.query(AuditFilter::default());
        recorder.append(rejection("TXN-1"));

        assert_eq!(trail.count(), 1);
        let first_pass: Vec<u64> = (&trail).into_iter().map(|e| e.sequence).collect();
        let second_pass: Vec<u64> = trail.iter().map(|e| e.sequence).collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(recorder.query(AuditFilter::default()).count(), 2);
    }

    #[test]
    fn test_concurrent_appends_keep_total_order() {
        let recorder = AuditRecorder::new();
        std::thread::scope(|scope| {
            for t in 0..8 {
                let recorder = &recorder;
                scope.spawn(move || {
                    for _ in 0..25 {
                        recorder.append(rejection(&format!("TXN-{t}")));
                    }
                });
            }
        });

        let sequences: Vec<u64> = recorder
            .query(AuditFilter::default())
            .iter()
            .map(|e| e.sequence)
            .collect();
        assert_eq!(sequences, (1..=200).collect::<Vec<u64>>());
    }
}
