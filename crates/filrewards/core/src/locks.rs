use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug)]
struct Slot {
    mutex: Arc<Mutex<()>>,
    /// Holders plus waiters. The slot is dropped from the pool at zero.
    leases: usize,
}

/// Per-key mutual exclusion for organization keys.
///
/// Distinct keys never contend. A key's slot lives only while someone holds
/// or waits on it; a fresh acquire after the last release creates a new slot,
/// and an acquire that races a release joins the existing one.
#[derive(Debug, Clone, Default)]
pub struct KeyLockPool {
    slots: Arc<DashMap<String, Slot>>,
}

impl KeyLockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task holds `key`. Dropping the returned guard
    /// releases it. Cancelling the wait gives the lease back.
    pub async fn acquire(&self, key: &str) -> KeyLockGuard {
        let mutex = {
            let mut slot = self.slots.entry(key.to_string()).or_insert_with(|| Slot {
                mutex: Arc::new(Mutex::new(())),
                leases: 0,
            });
            slot.leases += 1;
            slot.mutex.clone()
        };
        let lease = Lease {
            slots: self.slots.clone(),
            key: key.to_string(),
        };

        let guard = mutex.lock_owned().await;
        KeyLockGuard {
            _guard: guard,
            _lease: lease,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active_keys(&self) -> usize {
        self.slots.len()
    }
}

struct Lease {
    slots: Arc<DashMap<String, Slot>>,
    key: String,
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Entry::Occupied(mut entry) = self.slots.entry(std::mem::take(&mut self.key)) {
            let slot = entry.get_mut();
            slot.leases = slot.leases.saturating_sub(1);
            if slot.leases == 0 {
                entry.remove();
            }
        }
    }
}

/// Held section for one key. Field order matters: the mutex is released
/// before the lease is returned.
pub struct KeyLockGuard {
    _guard: OwnedMutexGuard<()>,
    _lease: Lease,
}
