//! Refund reconciliation.
//!
//! The orchestrator composes the ledger store, validation pipeline,
//! calculation engine, audit recorder and idempotency store into one
//! critical section per transaction.

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::RefundOrchestrator;
pub use outcome::{ReconciliationResponse, RefundOutcome, Rejection};
