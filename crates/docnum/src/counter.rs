use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;

/// The atomic per-year serial source backing number generation.
///
/// Implementations hold one counter row per calendar year, created lazily at
/// zero on first touch. The one contract that matters: [`increment`] advances
/// the row and reads back the new value in a *single atomic step*. Two
/// concurrent calls for the same year must never observe the same serial —
/// this is where uniqueness comes from, not from any existence check.
///
/// Counters never decrease and are never reused across years.
///
/// [`increment`]: CounterStore::increment
pub trait CounterStore {
    /// Atomically advances the counter for `year` and returns the
    /// post-increment serial. The first allocation in a year returns 1.
    ///
    /// # Errors
    ///
    /// [`StoreError::Transient`] when the underlying store cannot complete
    /// the increment (connection loss, lock timeout). Callers wrap this in a
    /// [`RetryPolicy`](crate::RetryPolicy).
    fn increment(&self, year: i32) -> impl Future<Output = Result<u64>> + Send;
}

impl<S: CounterStore + Sync> CounterStore for &S {
    fn increment(&self, year: i32) -> impl Future<Output = Result<u64>> + Send {
        S::increment(self, year)
    }
}

/// In-process [`CounterStore`] keeping one row per year behind a mutex.
///
/// The mutex scope *is* the atomic step: entry creation, increment, and
/// read-back all happen under the same guard. Suitable for tests and for
/// single-process deployments; a relational deployment implements
/// [`CounterStore`] over `UPDATE ... RETURNING` instead.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    rows: Mutex<HashMap<i32, u64>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current serial for `year`, or `None` if no allocation has touched it.
    pub fn current(&self, year: i32) -> Option<u64> {
        self.rows.lock().get(&year).copied()
    }
}

impl CounterStore for MemoryCounterStore {
    async fn increment(&self, year: i32) -> Result<u64> {
        let mut rows = self.rows.lock();
        let serial = rows.entry(year).or_insert(0);
        *serial += 1;
        Ok(*serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_allocation_creates_row_at_one() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.current(2025), None);
        assert_eq!(store.increment(2025).await.unwrap(), 1);
        assert_eq!(store.current(2025), Some(1));
    }

    #[tokio::test]
    async fn serial_increases_by_one_with_no_gaps() {
        let store = MemoryCounterStore::new();
        for expected in 1..=50 {
            assert_eq!(store.increment(2025).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn years_are_independent() {
        let store = MemoryCounterStore::new();
        store.increment(2025).await.unwrap();
        store.increment(2025).await.unwrap();
        assert_eq!(store.increment(2026).await.unwrap(), 1);
        assert_eq!(store.current(2025), Some(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_never_collide() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let store = Arc::new(MemoryCounterStore::new());
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let mut seen = Vec::with_capacity(100);
                    for _ in 0..100 {
                        seen.push(store.increment(2025).await.unwrap());
                    }
                    seen
                })
            })
            .collect();

        let mut all = HashSet::new();
        for result in futures::future::join_all(tasks).await {
            for serial in result.unwrap() {
                assert!(all.insert(serial), "serial {serial} issued twice");
            }
        }
        assert_eq!(all.len(), 800);
        assert_eq!(store.current(2025), Some(800));
    }
}
