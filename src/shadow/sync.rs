/*!
 * Sync-Object Shadow
 *
 * One cell per synchronization object. Each object kind contributes a
 * release/acquire style edge:
 *
 * | object       | release side            | acquire side                      |
 * |--------------|-------------------------|-----------------------------------|
 * | mutex        | `release` (overwrite)   | `acquire`                         |
 * | rw mutex     | `release_merge` (join)  | `acquire`                         |
 * | channel      | `send`, `close`         | `recv` (send clock + close clock) |
 * | wait group   | `done` (join)           | `wait`                            |
 *
 * Methods here only move clocks; the caller advances the context afterwards.
 */

use crate::clock::{self, VectorClock};
use crate::context::ExecutionContext;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

#[derive(Default)]
struct SyncClocks {
    release: Option<VectorClock>,
    send: Option<VectorClock>,
    recv: Option<VectorClock>,
    close: Option<VectorClock>,
    done: Option<VectorClock>,
}

impl Drop for SyncClocks {
    fn drop(&mut self) {
        for slot in [
            &mut self.release,
            &mut self.send,
            &mut self.recv,
            &mut self.close,
            &mut self.done,
        ] {
            if let Some(vc) = slot.take() {
                clock::release(vc);
            }
        }
    }
}

/// Overwrite `slot` with a copy of `source`, reusing the allocation
#[inline]
fn store(slot: &mut Option<VectorClock>, source: &VectorClock) {
    slot.get_or_insert_with(clock::acquire).copy_from(source);
}

/// Join `source` into `slot`
#[inline]
fn merge(slot: &mut Option<VectorClock>, source: &VectorClock) {
    slot.get_or_insert_with(clock::acquire).join(source);
}

/// Per-object shadow cell
#[derive(Default)]
pub struct SyncObjectShadow {
    clocks: Mutex<SyncClocks>,
    closed: AtomicBool,
    counter: AtomicI64,
}

/// Point-in-time copy of a sync cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub release: Option<VectorClock>,
    pub send: Option<VectorClock>,
    pub recv: Option<VectorClock>,
    pub close: Option<VectorClock>,
    pub done: Option<VectorClock>,
    pub closed: bool,
    pub counter: i64,
}

impl SyncObjectShadow {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Mutex / RW mutex
    // ---------------------------------------------------------------------

    /// Observe the last release
    pub fn acquire(&self, ctx: &mut ExecutionContext) {
        let clocks = self.clocks.lock();
        if let Some(release) = &clocks.release {
            ctx.absorb(release);
        }
    }

    /// Publish the releasing thread's clock, replacing earlier releases
    pub fn release(&self, ctx: &ExecutionContext) {
        store(&mut self.clocks.lock().release, ctx.clock());
    }

    /// Publish the releasing thread's clock on top of earlier releases
    ///
    /// Readers of an RW mutex unlock independently; the next writer must see
    /// all of them, not just the last.
    pub fn release_merge(&self, ctx: &ExecutionContext) {
        merge(&mut self.clocks.lock().release, ctx.clock());
    }

    // ---------------------------------------------------------------------
    // Channel
    // ---------------------------------------------------------------------

    pub fn send(&self, ctx: &ExecutionContext) {
        store(&mut self.clocks.lock().send, ctx.clock());
    }

    /// Observe the last send and, once closed, the close
    pub fn recv(&self, ctx: &mut ExecutionContext) {
        let mut clocks = self.clocks.lock();
        if let Some(send) = &clocks.send {
            ctx.absorb(send);
        }
        if self.closed.load(Ordering::Acquire) {
            if let Some(close) = &clocks.close {
                ctx.absorb(close);
            }
        }
        store(&mut clocks.recv, ctx.clock());
    }

    pub fn close(&self, ctx: &ExecutionContext) {
        let mut clocks = self.clocks.lock();
        store(&mut clocks.close, ctx.clock());
        self.closed.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // Wait group
    // ---------------------------------------------------------------------

    /// Adjust the pending count; returns the new value
    pub fn add(&self, delta: i64) -> i64 {
        self.counter.fetch_add(delta, Ordering::AcqRel) + delta
    }

    /// Fold the finishing thread into the done clock; returns the new count
    pub fn done(&self, ctx: &ExecutionContext) -> i64 {
        merge(&mut self.clocks.lock().done, ctx.clock());
        self.counter.fetch_sub(1, Ordering::AcqRel) - 1
    }

    /// Observe every completed participant
    pub fn wait(&self, ctx: &mut ExecutionContext) {
        let clocks = self.clocks.lock();
        if let Some(done) = &clocks.done {
            ctx.absorb(done);
        }
    }

    #[inline]
    pub fn counter(&self) -> i64 {
        self.counter.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let clocks = self.clocks.lock();
        SyncSnapshot {
            release: clocks.release.clone(),
            send: clocks.send.clone(),
            recv: clocks.recv.clone(),
            close: clocks.close.clone(),
            done: clocks.done.clone(),
            closed: self.is_closed(),
            counter: self.counter(),
        }
    }
}
