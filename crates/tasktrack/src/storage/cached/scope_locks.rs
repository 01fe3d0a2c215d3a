//! Keyed async mutual exclusion for cache population.
//!
//! One `tokio::sync::Mutex` exists per key while someone holds or waits for
//! it. The map entry is dropped together with the last guard, so the map
//! only grows with the number of keys currently in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// Per-key async locks, reclaimed when unused.
#[derive(Debug, Clone, Default)]
pub struct ScopeLocks {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

/// Holds the lock for one key until dropped.
#[must_use = "the scope is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    // Field order matters: the mutex guard must drop before `reclaim`
    // inspects the reference count.
    _guard: OwnedMutexGuard<()>,
    _reclaim: Reclaim,
}

#[derive(Debug)]
struct Reclaim {
    key: String,
    slot: Slot,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl Drop for Reclaim {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here. Waiters hold their own clone.
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.key);
        }
    }
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other guard for `key` is alive, then returns a guard.
    ///
    /// Cancelling the returned future before it resolves leaves no trace.
    pub async fn acquire(&self, key: &str) -> ScopeGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        let reclaim = Reclaim {
            key: key.to_string(),
            slot: Arc::clone(&slot),
            slots: Arc::clone(&self.slots),
        };
        let guard = slot.lock_owned().await;

        ScopeGuard {
            _guard: guard,
            _reclaim: reclaim,
        }
    }

    /// Number of keys currently held or awaited.
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::task::JoinSet;

    use super::*;

    #[tokio::test]
    async fn test_entry_reclaimed_after_release() {
        let locks = ScopeLocks::new();

        let guard = locks.acquire("tasks:a").await;
        assert_eq!(locks.in_flight(), 1);

        drop(guard);
        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = ScopeLocks::new();

        let _a = locks.acquire("tasks:a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("tasks:b")).await;

        assert!(b.is_ok());
        assert_eq!(locks.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_same_key_waits_for_release() {
        let locks = ScopeLocks::new();

        let held = locks.acquire("task:x").await;
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("task:x")).await;
        assert!(blocked.is_err());

        drop(held);
        let _next = locks.acquire("task:x").await;
        assert_eq!(locks.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_does_not_leak() {
        let locks = ScopeLocks::new();

        let held = locks.acquire("task:x").await;
        let _ = tokio::time::timeout(Duration::from_millis(20), locks.acquire("task:x")).await;
        drop(held);

        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mutual_exclusion_under_contention() {
        let locks = ScopeLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut set = JoinSet::new();
        for _ in 0..16 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            set.spawn(async move {
                let _guard = locks.acquire("tasks:shared").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            });
        }
        while let Some(result) = set.join_next().await {
            result.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.in_flight(), 0);
    }
}
