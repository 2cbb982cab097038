/*!
 * Overflow Guard
 *
 * Thread ids have 16 bits and clocks 48. Both saturate rather than wrap
 * (a wrapped clock would make old accesses look newer than current ones);
 * this guard makes sure somebody hears about it before precision degrades.
 *
 * The check is amortized: an operation counter is bumped on every access
 * and the calling context is inspected once every `interval` operations.
 * Each warning fires at most once per detector session.
 */

use crate::context::ExecutionContext;
use crate::core::hints::unlikely;
use crate::core::limits::{MAX_CLOCK, MAX_THREAD_ID};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Which overflow warnings have fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowStatus {
    pub operations: u64,
    pub thread_id_warned: bool,
    pub clock_warned: bool,
}

pub struct OverflowGuard {
    interval: u64,
    tid_threshold: u64,
    clock_threshold: u64,
    operations: AtomicU64,
    tid_warned: AtomicBool,
    clock_warned: AtomicBool,
}

impl OverflowGuard {
    pub fn new(interval: u64, warn_percent: u8) -> Self {
        let percent = u64::from(warn_percent.clamp(1, 100));
        Self {
            interval: interval.max(1),
            tid_threshold: MAX_THREAD_ID * percent / 100,
            clock_threshold: MAX_CLOCK / 100 * percent,
            operations: AtomicU64::new(0),
            tid_warned: AtomicBool::new(false),
            clock_warned: AtomicBool::new(false),
        }
    }

    /// Count one operation; every `interval` operations, inspect `ctx`
    #[inline(always)]
    pub fn tick(&self, ctx: &ExecutionContext) {
        let n = self.operations.fetch_add(1, Ordering::Relaxed) + 1;
        if unlikely(n % self.interval == 0) {
            self.check(ctx);
        }
    }

    #[cold]
    fn check(&self, ctx: &ExecutionContext) {
        if ctx.tid_clamped() || ctx.tid().as_u64() >= self.tid_threshold {
            warn_once(&self.tid_warned, || {
                tracing::warn!(
                    tid = %ctx.tid(),
                    clamped = ctx.tid_clamped(),
                    limit = MAX_THREAD_ID,
                    "thread id space nearly exhausted; ids past the limit share one clock slot"
                );
            });
        }

        let highest = ctx.clock().max_component();
        if highest >= self.clock_threshold {
            warn_once(&self.clock_warned, || {
                tracing::warn!(
                    tid = %ctx.tid(),
                    clock = highest,
                    limit = MAX_CLOCK,
                    "logical clock space nearly exhausted; clocks will saturate"
                );
            });
        }
    }

    pub fn status(&self) -> OverflowStatus {
        OverflowStatus {
            operations: self.operations.load(Ordering::Relaxed),
            thread_id_warned: self.tid_warned.load(Ordering::Relaxed),
            clock_warned: self.clock_warned.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.operations.store(0, Ordering::Relaxed);
        self.tid_warned.store(false, Ordering::Relaxed);
        self.clock_warned.store(false, Ordering::Relaxed);
    }
}

#[inline]
fn warn_once(flag: &AtomicBool, emit: impl FnOnce()) {
    if flag
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
        .is_ok()
    {
        emit();
    }
}
