/*!
 * Synchronization Events
 *
 * Lock, channel and wait-group hooks. Each one folds the event into the
 * object's shadow clocks and then advances the calling thread, so accesses
 * after the event get a fresh epoch.
 */

use super::Detector;
use crate::context::ExecutionContext;
use crate::core::types::Address;
use tracing::{trace, warn};

impl Detector {
    // =========================================================================
    // Mutex / RWMutex
    // =========================================================================

    /// Lock acquired (mutex lock, read or write lock of an rwlock)
    pub fn on_acquire(&self, sync_addr: Address, ctx: &mut ExecutionContext) {
        self.sync_objects.get_or_create(sync_addr).acquire(ctx);
        ctx.advance();
    }

    /// Exclusive release: replaces the object's clock
    pub fn on_release(&self, sync_addr: Address, ctx: &mut ExecutionContext) {
        self.sync_objects.get_or_create(sync_addr).release(ctx);
        ctx.advance();
    }

    /// Shared release (reader unlock): merges into the object's clock so
    /// a later writer sees every reader
    pub fn on_release_merge(&self, sync_addr: Address, ctx: &mut ExecutionContext) {
        self.sync_objects.get_or_create(sync_addr).release_merge(ctx);
        ctx.advance();
    }

    // =========================================================================
    // Channels
    // =========================================================================

    /// Before a send; ordering is recorded only once the send completes
    #[inline]
    pub fn on_channel_send_before(&self, ch_addr: Address, ctx: &ExecutionContext) {
        trace!(channel = ch_addr, tid = %ctx.tid(), "send begin");
    }

    pub fn on_channel_send_after(&self, ch_addr: Address, ctx: &mut ExecutionContext) {
        self.sync_objects.get_or_create(ch_addr).send(ctx);
        ctx.advance();
    }

    /// Before a receive; nothing is known until it completes
    #[inline]
    pub fn on_channel_recv_before(&self, ch_addr: Address, ctx: &ExecutionContext) {
        trace!(channel = ch_addr, tid = %ctx.tid(), "recv begin");
    }

    /// Receive completed: acquires every send so far, and the close if the
    /// channel has been closed
    pub fn on_channel_recv_after(&self, ch_addr: Address, ctx: &mut ExecutionContext) {
        self.sync_objects.get_or_create(ch_addr).recv(ctx);
        ctx.advance();
    }

    pub fn on_channel_close(&self, ch_addr: Address, ctx: &mut ExecutionContext) {
        self.sync_objects.get_or_create(ch_addr).close(ctx);
        ctx.advance();
    }

    // =========================================================================
    // Wait groups
    // =========================================================================

    /// Adjust the counter; no happens-before edge, only an advance
    pub fn on_wait_group_add(&self, wg_addr: Address, delta: i64, ctx: &mut ExecutionContext) {
        let counter = self.sync_objects.get_or_create(wg_addr).add(delta);
        if counter < 0 {
            warn!(
                wait_group = wg_addr,
                tid = %ctx.tid(),
                counter,
                "wait group counter went negative"
            );
        }
        ctx.advance();
    }

    /// Worker finished: decrements the counter and publishes its history
    pub fn on_wait_group_done(&self, wg_addr: Address, ctx: &mut ExecutionContext) {
        let counter = self.sync_objects.get_or_create(wg_addr).done(ctx);
        if counter < 0 {
            warn!(
                wait_group = wg_addr,
                tid = %ctx.tid(),
                counter,
                "wait group done without matching add"
            );
        }
        ctx.advance();
    }

    #[inline]
    pub fn on_wait_group_wait_before(&self, wg_addr: Address, ctx: &ExecutionContext) {
        trace!(wait_group = wg_addr, tid = %ctx.tid(), "wait begin");
    }

    /// Wait returned: every `done` so far happens-before the waiter
    pub fn on_wait_group_wait_after(&self, wg_addr: Address, ctx: &mut ExecutionContext) {
        self.sync_objects.get_or_create(wg_addr).wait(ctx);
        ctx.advance();
    }
}
