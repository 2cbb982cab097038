/*!
 * Vector Clock Pooling
 * Recycles clocks between thread start/end and read-state promotion/demotion
 *
 * Two tiers, like the buffer pools elsewhere in this style of code:
 * - a thread-local free list (no synchronization at all)
 * - a shared bounded `ArrayQueue` for clocks released on a different
 *   thread than the one that will reuse them (contexts often end on a
 *   different OS thread than the one that forked them)
 *
 * Every clock is zeroed on release, so `acquire` always hands out an
 * all-zero clock.
 */

use super::VectorClock;
use crate::core::limits::{
    INITIAL_CLOCK_CAPACITY, LOCAL_CLOCK_POOL_SIZE, MAX_POOLED_CLOCK_WIDTH, SHARED_CLOCK_POOL_SIZE,
};
use crossbeam_queue::ArrayQueue;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

thread_local! {
    static LOCAL_POOL: RefCell<Vec<VectorClock>> = const { RefCell::new(Vec::new()) };
}

static SHARED_POOL: OnceLock<ArrayQueue<VectorClock>> = OnceLock::new();
static HITS: AtomicU64 = AtomicU64::new(0);
static MISSES: AtomicU64 = AtomicU64::new(0);
static DISCARDED: AtomicU64 = AtomicU64::new(0);

fn shared() -> &'static ArrayQueue<VectorClock> {
    SHARED_POOL.get_or_init(|| ArrayQueue::new(SHARED_CLOCK_POOL_SIZE))
}

/// Pool counters (process-wide)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Acquisitions served from a free list
    pub hits: u64,
    /// Acquisitions that had to allocate
    pub misses: u64,
    /// Releases dropped because both tiers were full or the clock too wide
    pub discarded: u64,
}

/// Take a zeroed clock from the pool, allocating only if both tiers are empty
#[inline]
pub fn acquire() -> VectorClock {
    let local = LOCAL_POOL
        .try_with(|pool| pool.borrow_mut().pop())
        .ok()
        .flatten();

    if let Some(vc) = local.or_else(|| shared().pop()) {
        HITS.fetch_add(1, Ordering::Relaxed);
        return vc;
    }

    MISSES.fetch_add(1, Ordering::Relaxed);
    VectorClock::with_capacity(INITIAL_CLOCK_CAPACITY)
}

/// Return a clock to the pool
///
/// The clock is zeroed here. Oversized clocks are dropped so one burst of
/// high thread ids does not pin memory forever.
#[inline]
pub fn release(mut vc: VectorClock) {
    if vc.capacity() > MAX_POOLED_CLOCK_WIDTH {
        DISCARDED.fetch_add(1, Ordering::Relaxed);
        return;
    }
    vc.clear();

    // try_with: contexts may be dropped during thread-local teardown
    let overflow = LOCAL_POOL
        .try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < LOCAL_CLOCK_POOL_SIZE {
                pool.push(vc);
                None
            } else {
                Some(vc)
            }
        })
        .unwrap_or(None);

    if let Some(vc) = overflow {
        if shared().push(vc).is_err() {
            DISCARDED.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Snapshot of the process-wide pool counters
pub fn pool_stats() -> PoolStats {
    PoolStats {
        hits: HITS.load(Ordering::Relaxed),
        misses: MISSES.load(Ordering::Relaxed),
        discarded: DISCARDED.load(Ordering::Relaxed),
    }
}
