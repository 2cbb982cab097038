/*!
 * Location Shadow
 *
 * One cell per instrumented address: the last write, the adaptive read
 * history and an ownership tag.
 *
 * # Read state
 *
 * ```text
 *            read (first)          concurrent read
 *   Empty ---------------> Single ----------------> Shared
 *     ^                      |                        |
 *     +------- write --------+--------- write --------+
 * ```
 *
 * Almost every location lives in `Empty`/`Single`; `Shared` is only needed
 * once two reads are genuinely concurrent, and the next write drops back.
 *
 * # Ownership
 *
 * `Unclaimed -> Owned(tid) -> Shared`, claimed by CAS on the first access.
 * While one thread owns a cell its own writes skip the happens-before check.
 * A write or read by any other thread makes the cell `Shared` for good, so
 * the fast path never skips a check against a foreign read.
 *
 * # Concurrency
 *
 * The last write, the ownership tag and a mirror of the single read epoch
 * are atomics so the same-epoch checks never lock. Everything else sits
 * behind a per-cell `parking_lot::Mutex`, held across check and update so
 * two accesses to one address see each other in some order. The ownership
 * fast path takes the lock too: it skips the vector-clock comparison, not
 * the serialization with concurrent readers.
 */

use super::stats::AtomicPromotionStats;
use crate::clock::{self, Epoch, ThreadId, VectorClock};
use crate::context::ExecutionContext;
use crate::core::hints::{likely, unlikely};
use crate::report::RaceKind;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Ownership tag encoding: 0 unclaimed, `u64::MAX` shared, else tid + 1
const OWNER_UNCLAIMED: u64 = 0;
const OWNER_SHARED: u64 = u64::MAX;

/// Read mirror value while the read state is `Shared`. Has clock 0, so it
/// can never equal a live epoch.
const READ_MIRROR_SHARED: u64 = Epoch::new(ThreadId::MAX, 0).to_bits();

/// Ownership of a location for the single-writer fast path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    Unclaimed,
    Owned(ThreadId),
    Shared,
}

impl Ownership {
    #[inline(always)]
    const fn encode(self) -> u64 {
        match self {
            Ownership::Unclaimed => OWNER_UNCLAIMED,
            Ownership::Owned(tid) => tid.as_u64() + 1,
            Ownership::Shared => OWNER_SHARED,
        }
    }

    #[inline(always)]
    const fn decode(raw: u64) -> Self {
        match raw {
            OWNER_UNCLAIMED => Ownership::Unclaimed,
            OWNER_SHARED => Ownership::Shared,
            n => Ownership::Owned(ThreadId((n - 1) as u16)),
        }
    }
}

/// Read history of a location
#[derive(Debug, Default)]
pub enum ReadState {
    /// No read since the last write
    #[default]
    Empty,
    /// All reads so far are ordered; only the latest matters
    Single(Epoch),
    /// Concurrent readers; component `t` is thread t's latest read
    Shared(VectorClock),
}

impl ReadState {
    pub fn kind(&self) -> ReadStateKind {
        match self {
            ReadState::Empty => ReadStateKind::Empty,
            ReadState::Single(_) => ReadStateKind::Single,
            ReadState::Shared(_) => ReadStateKind::Shared,
        }
    }

    /// First recorded read not visible to `clock`
    fn first_unordered(&self, clock: &VectorClock) -> Option<Epoch> {
        match self {
            ReadState::Empty => None,
            ReadState::Single(read) => (!read.happens_before(clock)).then_some(*read),
            ReadState::Shared(reads) => reads
                .first_uncovered(clock)
                .map(|(tid, c)| Epoch::new(tid, c)),
        }
    }
}

/// Tag-only view of [`ReadState`] for snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadStateKind {
    Empty,
    Single,
    Shared,
}

/// A prior access the current one races with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub kind: RaceKind,
    pub previous: Epoch,
}

/// Result of running one access through a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Same logical instant as the recorded access; nothing changed
    SameEpoch,
    /// Single-writer fast path; no happens-before check ran
    Owned,
    /// Full check ran and passed
    Checked,
    /// Full check found a race; shadow state was still updated
    Race(Conflict),
}

#[derive(Default)]
struct ReadSide {
    state: ReadState,
    promotions: u32,
    demotions: u32,
}

impl Drop for ReadSide {
    fn drop(&mut self) {
        if let ReadState::Shared(reads) = std::mem::take(&mut self.state) {
            clock::release(reads);
        }
    }
}

/// Per-address shadow cell
#[derive(Default)]
pub struct LocationShadow {
    last_write: AtomicU64,
    read_mirror: AtomicU64,
    owner: AtomicU64,
    reads: Mutex<ReadSide>,
}

/// Point-in-time view of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub last_write: Epoch,
    pub read_state: ReadStateKind,
    pub ownership: Ownership,
    pub promotions: u32,
    pub demotions: u32,
}

impl LocationShadow {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn last_write(&self) -> Epoch {
        Epoch::from_bits(self.last_write.load(Ordering::Acquire))
    }

    #[inline]
    pub fn ownership(&self) -> Ownership {
        Ownership::decode(self.owner.load(Ordering::Acquire))
    }

    /// Check and record a write by `ctx`
    pub fn write(&self, ctx: &ExecutionContext, stats: &AtomicPromotionStats) -> AccessOutcome {
        let current = ctx.current_epoch();
        let tid = ctx.tid();
        let previous = self.last_write();

        if likely(Epoch::same(previous, current)) {
            stats.inc_same_epoch();
            return AccessOutcome::SameEpoch;
        }

        let claimed = self.claim(tid);
        self.write_claimed(ctx, claimed, stats)
    }

    /// Second half of [`write`](Self::write), after the ownership claim
    ///
    /// The claim is re-checked under the cell lock: a foreign read may have
    /// made the cell `Shared` between the CAS and here, and its read must
    /// then go through the full check instead of being demoted away.
    fn write_claimed(
        &self,
        ctx: &ExecutionContext,
        claimed: bool,
        stats: &AtomicPromotionStats,
    ) -> AccessOutcome {
        let current = ctx.current_epoch();
        let tid = ctx.tid();

        let mut reads = self.reads.lock();
        let previous = self.last_write();

        if claimed
            && likely(self.owned_by(tid))
            && (previous.is_none() || previous.tid() == tid)
            && previous.clock() <= current.clock()
        {
            self.last_write.store(current.to_bits(), Ordering::Release);
            self.demote(&mut reads, stats);
            stats.inc_owned_writes();
            return AccessOutcome::Owned;
        }

        let conflict = if !previous.happens_before(ctx.clock()) {
            Some(Conflict {
                kind: RaceKind::WriteWrite,
                previous,
            })
        } else {
            reads.state.first_unordered(ctx.clock()).map(|read| Conflict {
                kind: RaceKind::ReadWrite,
                previous: read,
            })
        };

        self.last_write.store(current.to_bits(), Ordering::Release);
        self.demote(&mut reads, stats);

        match conflict {
            Some(conflict) => AccessOutcome::Race(conflict),
            None => AccessOutcome::Checked,
        }
    }

    /// Check and record a read by `ctx`
    pub fn read(&self, ctx: &ExecutionContext, stats: &AtomicPromotionStats) -> AccessOutcome {
        let current = ctx.current_epoch();
        let tid = ctx.tid();

        if likely(self.read_mirror.load(Ordering::Acquire) == current.to_bits()) {
            stats.inc_same_epoch();
            return AccessOutcome::SameEpoch;
        }

        // A foreign reader ends exclusive ownership, so the owner's later
        // writes go through the full check against this read
        self.claim(tid);

        let mut reads = self.reads.lock();
        let previous = self.last_write();

        let conflict = (!previous.happens_before(ctx.clock())).then_some(Conflict {
            kind: RaceKind::WriteRead,
            previous,
        });

        match &mut reads.state {
            ReadState::Empty => {
                stats.inc_fast_path_reads();
                reads.state = ReadState::Single(current);
                self.read_mirror.store(current.to_bits(), Ordering::Release);
            }
            ReadState::Single(last) => {
                let last = *last;
                if last.tid() == tid || last.happens_before(ctx.clock()) {
                    stats.inc_fast_path_reads();
                    reads.state = ReadState::Single(current);
                    self.read_mirror.store(current.to_bits(), Ordering::Release);
                } else {
                    let mut shared = clock::acquire();
                    shared.set(last.tid(), last.clock());
                    shared.set(tid, current.clock());
                    reads.state = ReadState::Shared(shared);
                    reads.promotions = reads.promotions.saturating_add(1);
                    self.read_mirror.store(READ_MIRROR_SHARED, Ordering::Release);
                    stats.record_promotion();
                    stats.inc_slow_path_reads();
                    tracing::trace!(tid = %tid, last = %last, "read state promoted");
                }
            }
            ReadState::Shared(shared) => {
                stats.inc_slow_path_reads();
                shared.set(tid, current.clock());
            }
        }

        match conflict {
            Some(conflict) => AccessOutcome::Race(conflict),
            None => AccessOutcome::Checked,
        }
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        let reads = self.reads.lock();
        LocationSnapshot {
            last_write: self.last_write(),
            read_state: reads.state.kind(),
            ownership: self.ownership(),
            promotions: reads.promotions,
            demotions: reads.demotions,
        }
    }

    #[inline]
    fn owned_by(&self, tid: ThreadId) -> bool {
        self.owner.load(Ordering::Acquire) == Ownership::Owned(tid).encode()
    }

    /// Try to make `tid` the owner. True if `tid` owns the cell afterwards.
    #[inline]
    fn claim(&self, tid: ThreadId) -> bool {
        let mine = Ownership::Owned(tid).encode();
        let mut observed = self.owner.load(Ordering::Acquire);

        if observed == OWNER_UNCLAIMED {
            match self.owner.compare_exchange(
                OWNER_UNCLAIMED,
                mine,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => observed = actual,
            }
        }

        if likely(observed == mine) {
            return true;
        }
        if observed != OWNER_SHARED {
            // Second distinct thread; Shared is terminal so a plain store is enough
            self.owner.store(OWNER_SHARED, Ordering::Release);
        }
        false
    }

    /// A write dominates every prior read: back to `Empty`
    #[inline]
    fn demote(&self, reads: &mut ReadSide, stats: &AtomicPromotionStats) {
        match std::mem::take(&mut reads.state) {
            ReadState::Shared(shared) => {
                clock::release(shared);
                reads.demotions = reads.demotions.saturating_add(1);
                stats.record_demotion();
            }
            ReadState::Single(_) | ReadState::Empty => {}
        }
        if unlikely(self.read_mirror.load(Ordering::Relaxed) != 0) {
            self.read_mirror.store(0, Ordering::Release);
        }
    }
}
