//! Replay-safe refund creation.
//!
//! Maps caller-supplied keys to the outcome first produced for them, so a
//! retried request returns the original response instead of running again.

pub mod store;

pub use store::{IdempotencyBegin, IdempotencyStore, StoredResponse};
