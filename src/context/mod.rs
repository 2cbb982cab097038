/*!
 * Execution Contexts
 *
 * Per-thread detector state: the thread id, the thread's vector clock and a
 * cached epoch `Epoch(tid, clock[tid])`. The cache is what the access hot
 * path reads, so every mutation of the own component goes through
 * [`ExecutionContext::advance`] or [`ExecutionContext::absorb`], both of which
 * refresh it.
 *
 * Contexts are single-owner. The instrumentation layer keeps one per thread
 * of execution (an OS thread, a green thread, a task) and passes it by
 * `&mut` into every detector event.
 *
 * # Lifecycle
 * - [`ExecutionContext::start`]: root thread, own clock 1
 * - [`ExecutionContext::fork`]: child of a parent snapshot, own clock 1
 * - drop: the vector clock goes back to the pool
 */

use crate::clock::{self, Epoch, ThreadId, VectorClock};
use crate::core::limits::INITIAL_CLOCK;
use crate::core::types::{Clock, RawThreadId};
use std::fmt;

/// Per-thread logical time
pub struct ExecutionContext {
    tid: ThreadId,
    clock: VectorClock,
    epoch: Epoch,
    tid_clamped: bool,
}

impl ExecutionContext {
    /// Fresh thread with no history
    pub fn start(raw_tid: RawThreadId) -> Self {
        let (tid, tid_clamped) = ThreadId::from_raw(raw_tid);
        let mut clock = clock::acquire();
        clock.set(tid, INITIAL_CLOCK);

        Self {
            tid,
            clock,
            epoch: Epoch::new(tid, INITIAL_CLOCK),
            tid_clamped,
        }
    }

    /// Thread created by a parent whose clock was `parent_clock` at fork time
    ///
    /// Everything the parent did before the fork happens-before everything
    /// the child does.
    pub fn fork(raw_tid: RawThreadId, parent_clock: &VectorClock) -> Self {
        let (tid, tid_clamped) = ThreadId::from_raw(raw_tid);
        let mut clock = clock::acquire();
        clock.copy_from(parent_clock);
        clock.set(tid, INITIAL_CLOCK);

        Self {
            tid,
            clock,
            epoch: Epoch::new(tid, INITIAL_CLOCK),
            tid_clamped,
        }
    }

    /// Fork a child from this context and advance past the fork point
    ///
    /// The advance keeps the parent's post-fork accesses concurrent with the
    /// child's.
    pub fn spawn(&mut self, raw_tid: RawThreadId) -> Self {
        let child = Self::fork(raw_tid, &self.clock);
        self.advance();
        child
    }

    /// Consume a finished child: its whole history happens-before the
    /// joiner's next event
    pub fn join_thread(&mut self, child: ExecutionContext) {
        self.absorb(&child.clock);
        self.advance();
    }

    /// Step the own component; call after all checks of the current event
    #[inline(always)]
    pub fn advance(&mut self) {
        let next = self.clock.increment(self.tid);
        self.epoch = Epoch::new(self.tid, next);
    }

    /// Merge another clock into this one (acquire side of an edge)
    #[inline]
    pub(crate) fn absorb(&mut self, other: &VectorClock) {
        self.clock.join(other);
        self.epoch = Epoch::new(self.tid, self.clock.get(self.tid));
    }

    /// Cached epoch, a plain field read
    #[inline(always)]
    pub fn current_epoch(&self) -> Epoch {
        self.epoch
    }

    #[inline(always)]
    pub fn tid(&self) -> ThreadId {
        self.tid
    }

    /// Own component of the clock
    #[inline(always)]
    pub fn own_clock(&self) -> Clock {
        self.epoch.clock()
    }

    #[inline(always)]
    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    /// Pooled copy of the clock (e.g. to hand to [`ExecutionContext::fork`]
    /// on another thread); release it with [`crate::clock::release`]
    pub fn snapshot(&self) -> VectorClock {
        let mut copy = clock::acquire();
        copy.copy_from(&self.clock);
        copy
    }

    /// The raw id did not fit in 16 bits and was saturated
    #[inline]
    pub fn tid_clamped(&self) -> bool {
        self.tid_clamped
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        clock::release(std::mem::take(&mut self.clock));
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("tid", &self.tid)
            .field("epoch", &self.epoch)
            .field("clock", &self.clock)
            .finish()
    }
}
