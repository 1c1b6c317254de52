//! Query object pool
//!
//! Amortizes allocation across many dispatch/execute cycles. The contract is
//! acquire, populate once, execute once, release. A query is owned by exactly
//! one holder at a time, so no locking is needed on the query itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::Query;

/// Thread-safe pool of reusable [`Query`] values
#[derive(Debug, Default)]
pub struct QueryPool {
    free: Mutex<Vec<Query>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl QueryPool {
    /// Create a pool that retains at most `capacity` released queries
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            next_id: AtomicU64::new(0),
            capacity,
        }
    }

    /// Take a cleared query from the pool, allocating if none are free.
    ///
    /// Every acquisition gets a fresh identifier.
    pub fn acquire(&self) -> Query {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();

        let mut query = reused.unwrap_or_default();
        query.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        query
    }

    /// Return a query to the pool. Its contents are cleared.
    pub fn release(&self, mut query: Query) {
        query.reset();
        let mut free = self
            .free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if free.len() < self.capacity {
            free.push(query);
        }
    }

    /// Number of queries waiting to be reused
    pub fn available(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Number of identifiers handed out so far
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_acquire_assigns_fresh_ids() {
        let pool = QueryPool::new(4);
        let a = pool.acquire();
        let b = pool.acquire();

        assert_ne!(a.id, b.id);
        assert_eq!(pool.issued(), 2);
    }

    #[test]
    fn test_release_clears_and_reuses() {
        let pool = QueryPool::new(4);
        let mut q = pool.acquire();
        q.fill("GET", "/query?db=bench", b"", "label", "n/a");
        pool.release(q);
        assert_eq!(pool.available(), 1);

        let q = pool.acquire();
        assert!(q.is_empty());
        assert!(q.human_label.is_empty());
        assert_eq!(q.id, 1);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_release_respects_capacity() {
        let pool = QueryPool::new(1);
        pool.release(Query::new());
        pool.release(Query::new());
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(QueryPool::new(16));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let q = pool.acquire();
                        pool.release(q);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.issued(), 400);
        assert!(pool.available() <= 16);
    }
}
