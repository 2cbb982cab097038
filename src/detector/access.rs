/*!
 * Memory Access Events
 * on_read / on_write: sampling gate, shadow update, race reporting
 */

use super::Detector;
use crate::clock::Epoch;
use crate::context::ExecutionContext;
use crate::core::hints::{likely, unlikely};
use crate::core::types::Address;
use crate::report::{AccessInfo, AccessKind, RaceKey, RaceRecord, StackTrace};
use crate::shadow::{AccessOutcome, Conflict};
use tracing::trace;

impl Detector {
    /// Instrumented read of `addr` by the thread owning `ctx`
    #[inline]
    pub fn on_read(&self, addr: Address, ctx: &mut ExecutionContext) {
        self.on_access(addr, ctx, AccessKind::Read);
    }

    /// Instrumented write of `addr` by the thread owning `ctx`
    #[inline]
    pub fn on_write(&self, addr: Address, ctx: &mut ExecutionContext) {
        self.on_access(addr, ctx, AccessKind::Write);
    }

    fn on_access(&self, addr: Address, ctx: &mut ExecutionContext, kind: AccessKind) {
        self.overflow.tick(ctx);

        if let Some(sampler) = &self.sampler {
            if likely(!sampler.should_sample()) {
                return;
            }
        }

        let cell = self.locations.get_or_create(addr);
        let outcome = match kind {
            AccessKind::Read => {
                self.stats.inc_reads();
                cell.read(ctx, &self.stats)
            }
            AccessKind::Write => {
                self.stats.inc_writes();
                cell.write(ctx, &self.stats)
            }
        };

        match outcome {
            AccessOutcome::SameEpoch => return,
            AccessOutcome::Race(conflict) => self.report_race(addr, ctx, conflict),
            AccessOutcome::Owned | AccessOutcome::Checked => {}
        }

        if unlikely(self.stack_capture.is_some()) && kind == AccessKind::Write {
            if let Some(stack) = self.capture_stack() {
                self.write_stacks.insert(addr, stack);
            }
        }

        if self.options.advance_on_access {
            ctx.advance();
        }
    }

    #[cold]
    #[inline(never)]
    fn report_race(&self, addr: Address, ctx: &ExecutionContext, conflict: Conflict) {
        let Conflict { kind, previous } = conflict;
        let key = RaceKey::new(kind, addr, ctx.tid(), previous.tid());

        if !self.races.record(key) {
            trace!(address = addr, %kind, "duplicate race suppressed");
            return;
        }

        let previous_stack = match kind.previous_access() {
            AccessKind::Write => self.write_stacks.get(&addr).map(|s| s.value().clone()),
            AccessKind::Read => None,
        };

        let record = RaceRecord {
            kind,
            current: AccessInfo {
                kind: kind.current_access(),
                address: addr,
                thread_id: ctx.tid(),
                epoch: ctx.current_epoch(),
                stack: self.capture_stack(),
            },
            previous: AccessInfo {
                kind: kind.previous_access(),
                address: addr,
                thread_id: previous.tid(),
                epoch: previous,
                stack: previous_stack,
            },
            key,
        };

        self.sink.report(&record);
    }

    fn capture_stack(&self) -> Option<StackTrace> {
        self.stack_capture.as_ref().and_then(|c| c.capture())
    }

    /// Last write epoch recorded for `addr`, or [`Epoch::NONE`]
    pub fn last_write(&self, addr: Address) -> Epoch {
        self.locations
            .get(addr)
            .map_or(Epoch::NONE, |cell| cell.last_write())
    }
}
