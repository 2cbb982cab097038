/*!
 * Race Log
 * Race counter and deduplication set
 *
 * Only touched once a race has been found, so a single lock is fine here;
 * the access path never reaches it.
 */

use crate::report::RaceKey;
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counted, deduplicated set of reported races
pub struct RaceLog {
    count: AtomicU64,
    seen: Mutex<HashSet<RaceKey, RandomState>>,
}

impl RaceLog {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            seen: Mutex::new(HashSet::with_hasher(RandomState::new())),
        }
    }

    /// Register a race; false (and no count) if the key was already seen
    pub fn record(&self, key: RaceKey) -> bool {
        let mut seen = self.seen.lock();
        if seen.insert(key) {
            self.count.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn contains(&self, key: &RaceKey) -> bool {
        self.seen.lock().contains(key)
    }

    pub fn keys(&self) -> Vec<RaceKey> {
        self.seen.lock().iter().copied().collect()
    }

    pub fn clear(&self) {
        let mut seen = self.seen.lock();
        seen.clear();
        self.count.store(0, Ordering::Relaxed);
    }
}

impl Default for RaceLog {
    fn default() -> Self {
        Self::new()
    }
}
