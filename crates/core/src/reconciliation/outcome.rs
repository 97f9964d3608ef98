//! Discriminated result of a reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::idempotency::StoredResponse;
use crate::ledger::Refund;
use crate::validation::RefundError;

/// HTTP-equivalent status of a created refund.
pub const CREATED_STATUS: u16 = 201;
/// HTTP-equivalent status of a replayed response.
pub const REPLAY_STATUS: u16 = 200;

/// A rejected request, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: String,
    pub message: String,
    pub details: Value,
    /// HTTP-equivalent status.
    pub status: u16,
}

impl From<&RefundError> for Rejection {
    fn from(error: &RefundError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: error.details(),
            status: error.http_status_code(),
        }
    }
}

/// What a reconciliation decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundOutcome {
    Completed(Refund),
    Rejected(Rejection),
}

impl RefundOutcome {
    /// HTTP-equivalent status of the original decision.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Completed(_) => CREATED_STATUS,
            Self::Rejected(rejection) => rejection.status,
        }
    }

    /// Returns true for an internal fault.
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::Rejected(r) if r.status >= 500)
    }
}

/// Response handed back to the caller of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResponse {
    pub outcome: RefundOutcome,
    /// Status of the decision when it was first made.
    pub original_status: u16,
    /// True when the outcome was returned from the idempotency store.
    pub replayed: bool,
    /// When the decision was made.
    pub recorded_at: DateTime<Utc>,
}

impl ReconciliationResponse {
    /// Response for a decision made by this call.
    #[must_use]
    pub fn fresh(outcome: RefundOutcome) -> Self {
        Self {
            original_status: outcome.status_code(),
            outcome,
            replayed: false,
            recorded_at: Utc::now(),
        }
    }

    /// Response for a decision made by this call and stored under a key.
    #[must_use]
    pub fn stored(stored: StoredResponse<RefundOutcome>) -> Self {
        Self {
            outcome: stored.payload,
            original_status: stored.status,
            replayed: false,
            recorded_at: stored.recorded_at,
        }
    }

    /// Response replaying an earlier decision.
    #[must_use]
    pub fn replay(stored: StoredResponse<RefundOutcome>) -> Self {
        Self {
            replayed: true,
            ..Self::stored(stored)
        }
    }

    /// Status to report: the original one, or 200 for a replay.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        if self.replayed {
            REPLAY_STATUS
        } else {
            self.original_status
        }
    }

    /// The created refund, if the request succeeded.
    #[must_use]
    pub fn refund(&self) -> Option<&Refund> {
        match &self.outcome {
            RefundOutcome::Completed(refund) => Some(refund),
            RefundOutcome::Rejected(_) => None,
        }
    }

    /// The rejection, if the request failed.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match &self.outcome {
            RefundOutcome::Completed(_) => None,
            RefundOutcome::Rejected(rejection) => Some(rejection),
        }
    }
}
