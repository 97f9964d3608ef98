//! Refund reconciliation engine.
//!
//! This crate contains pure business logic with ZERO web dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Transactions, refunds and the in-memory ledger store
//! - `calculation` - Exact decimal refund allocation
//! - `validation` - Ordered admissibility checks and the refund error taxonomy
//! - `idempotency` - Replay-safe refund creation
//! - `audit` - Append-only decision trail
//! - `reconciliation` - The orchestrator tying the above into one critical section

pub mod audit;
pub mod calculation;
pub mod idempotency;
pub mod ledger;
pub mod reconciliation;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
