//! Idempotency key store.
//!
//! Keys live for the lifetime of the process; there is no expiry. Stored
//! payloads are owned copies, so later ledger changes never alter a replay.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Response recorded against a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse<T> {
    /// HTTP-equivalent status of the original outcome.
    pub status: u16,
    /// The original outcome.
    pub payload: T,
    /// When the outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Result of [`IdempotencyStore::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyBegin<T> {
    /// Key was unseen and is now reserved for the caller.
    New,
    /// Key was already finalized; return this response verbatim.
    Replay(StoredResponse<T>),
    /// Key is reserved by a request that has not finished yet.
    InProgress,
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Pending,
    Finalized(StoredResponse<T>),
}

/// Concurrent map from idempotency key to recorded outcome.
#[derive(Debug)]
pub struct IdempotencyStore<T> {
    slots: DashMap<String, Slot<T>>,
}

impl<T> Default for IdempotencyStore<T> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }
}

impl<T: Clone> IdempotencyStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `key` or reports what it already maps to.
    ///
    /// Check and reservation happen under one shard lock, so two concurrent
    /// callers can never both see `New` for the same key.
    pub fn begin(&self, key: &str) -> IdempotencyBegin<T> {
        match self.slots.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(Slot::Pending);
                IdempotencyBegin::New
            }
            Entry::Occupied(slot) => match slot.get() {
                Slot::Pending => IdempotencyBegin::InProgress,
                Slot::Finalized(response) => IdempotencyBegin::Replay(response.clone()),
            },
        }
    }

    /// Records the outcome for `key`.
    ///
    /// A finalized key is read-only: finalizing it again keeps the first
    /// outcome. Returns whichever response is stored after the call.
    pub fn finalize(&self, key: &str, status: u16, payload: T) -> StoredResponse<T> {
        let mut slot = self.slots.entry(key.to_string()).or_insert(Slot::Pending);
        if let Slot::Finalized(existing) = slot.value() {
            return existing.clone();
        }

        let response = StoredResponse {
            status,
            payload,
            recorded_at: Utc::now(),
        };
        *slot = Slot::Finalized(response.clone());
        response
    }

    /// Releases a reservation without recording an outcome.
    ///
    /// Finalized keys are left untouched.
    pub fn abandon(&self, key: &str) {
        self.slots.remove_if(key, |_, slot| matches!(slot, Slot::Pending));
    }

    /// Returns the finalized response for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<StoredResponse<T>> {
        self.slots.get(key).and_then(|slot| match slot.value() {
            Slot::Finalized(response) => Some(response.clone()),
            Slot::Pending => None,
        })
    }

    /// Number of keys seen, pending or finalized.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no key has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_new_then_replay() {
        let store: IdempotencyStore<String> = IdempotencyStore::new();
        assert_eq!(store.begin("k1"), IdempotencyBegin::New);

        let stored = store.finalize("k1", 201, "refund-1".to_string());
        assert_eq!(stored.status, 201);

        match store.begin("k1") {
            IdempotencyBegin::Replay(response) => assert_eq!(response, stored),
            other => panic!("expected replay, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_key_is_in_progress() {
        let store: IdempotencyStore<String> = IdempotencyStore::new();
        assert_eq!(store.begin("k1"), IdempotencyBegin::New);
        assert_eq!(store.begin("k1"), IdempotencyBegin::InProgress);
        assert!(store.get("k1").is_none());
    }

    #[test]
    fn test_finalize_is_write_once() {
        let store: IdempotencyStore<String> = IdempotencyStore::new();
        store.begin("k1");
        let first = store.finalize("k1", 422, "rejected".to_string());
        let second = store.finalize("k1", 201, "created".to_string());
        assert_eq!(first, second);
        assert_eq!(store.get("k1").unwrap().payload, "rejected");
    }

    #[test]
    fn test_abandon_releases_only_pending() {
        let store: IdempotencyStore<String> = IdempotencyStore::new();
        store.begin("pending");
        store.begin("done");
        store.finalize("done", 201, "ok".to_string());

        store.abandon("pending");
        store.abandon("done");

        assert_eq!(store.begin("pending"), IdempotencyBegin::New);
        assert!(matches!(store.begin("done"), IdempotencyBegin::Replay(_)));
    }

    #[test]
    fn test_concurrent_begin_grants_one_reservation() {
        let store: Arc<IdempotencyStore<u32>> = Arc::new(IdempotencyStore::new());
        let granted = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    if store.begin("shared") == IdempotencyBegin::New {
                        granted.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(granted.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }
}
