//! Per-owner serialization of ledger mutations.
//!
//! Two requests for the same owner must not interleave a read-modify-write.
//! Callers hold the guard returned by [`OwnerLocks::lock`] for the whole
//! mutation. Different owners never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per owner.
#[derive(Debug, Default, Clone)]
pub struct OwnerLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

impl OwnerLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `owner_id`'s ledger.
    pub async fn lock(&self, owner_id: i64) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(owner_id).or_default())
        };
        mutex.lock_owned().await
    }
}
