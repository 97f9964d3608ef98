//! Ledger store and refund entities.
//!
//! This module implements:
//! - Transactions, payments and items as registered by the processor
//! - Completed refunds
//! - The in-memory store with per-transaction locking
//! - Error types for registration and store access

pub mod error;
pub mod refund;
pub mod store;
pub mod transaction;

pub use error::LedgerError;
pub use refund::{Refund, RefundKind, RefundStatus};
pub use store::{LedgerHandle, LedgerStore, TransactionLedger, TransactionView};
pub use transaction::{Item, Payment, PaymentMethodType, Transaction, TransactionStatus};
