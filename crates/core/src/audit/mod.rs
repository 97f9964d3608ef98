//! Append-only decision trail.
//!
//! Every refund decision, accepted or rejected, is recorded exactly once.
//! Entries are never updated or deleted.

pub mod entry;
pub mod recorder;

pub use entry::{AuditAction, AuditDraft, AuditEntry};
pub use recorder::{AuditFilter, AuditRecorder, AuditTrail};
