//! Per-key async mutual exclusion.
//!
//! [`KeyedLocks::lock`] serializes tasks that use the same key and lets
//! different keys proceed in parallel. Entries are dropped from the map as
//! soon as nobody holds or waits on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Debug, Default, Clone)]
pub struct KeyedLocks {
    slots: Slots,
}

/// Held lock for one key. Releasing it wakes the next waiter, if any.
#[derive(Debug)]
pub struct KeyGuard {
    key: String,
    slot: Arc<AsyncMutex<()>>,
    slots: Slots,
    _guard: OwnedMutexGuard<()>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task holds `key`, then hold it.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key.to_string()).or_default().clone()
        };
        let guard = slot.clone().lock_owned().await;
        KeyGuard {
            key: key.to_string(),
            slot,
            slots: self.slots.clone(),
            _guard: guard,
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one in `slot`, one inside the guard.
        // Anything above that is a waiter, which cloned under this same lock.
        if Arc::strong_count(&self.slot) <= 3 {
            slots.remove(&self.key);
        }
    }
}
