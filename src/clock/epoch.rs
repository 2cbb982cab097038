/*!
 * Epochs
 *
 * A thread's logical instant packed into one word:
 *
 * ```text
 *  63            48 47                                           0
 * +----------------+----------------------------------------------+
 * |   thread id    |                 logical clock                |
 * +----------------+----------------------------------------------+
 * ```
 *
 * Clocks start at 1, so the all-zero word means "no access recorded".
 * Equality of two words is the cheapest possible race-impossibility check.
 */

use super::{ThreadId, VectorClock};
use crate::core::limits::{CLOCK_BITS, CLOCK_MASK, MAX_CLOCK};
use crate::core::types::Clock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Packed (thread id, clock) pair
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    /// "Never happened"
    pub const NONE: Epoch = Epoch(0);

    /// Pack a thread id and clock; clocks above [`MAX_CLOCK`] saturate
    #[inline(always)]
    pub const fn new(tid: ThreadId, clock: Clock) -> Self {
        let clock = if clock > MAX_CLOCK { MAX_CLOCK } else { clock };
        Self((tid.as_u64() << CLOCK_BITS) | clock)
    }

    #[inline(always)]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline(always)]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn tid(self) -> ThreadId {
        ThreadId((self.0 >> CLOCK_BITS) as u16)
    }

    #[inline(always)]
    pub const fn clock(self) -> Clock {
        self.0 & CLOCK_MASK
    }

    #[inline(always)]
    pub const fn decode(self) -> (ThreadId, Clock) {
        (self.tid(), self.clock())
    }

    /// No access recorded
    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.clock() == 0
    }

    /// Exact equality of the packed words
    #[inline(always)]
    pub const fn same(a: Epoch, b: Epoch) -> bool {
        a.0 == b.0
    }

    /// `vc[tid] >= clock`: the access this epoch names is visible to `vc`
    ///
    /// [`Epoch::NONE`] happens-before everything.
    #[inline(always)]
    pub fn happens_before(self, vc: &VectorClock) -> bool {
        vc.get(self.tid()) >= self.clock()
    }
}

/// Epochs of one thread are totally ordered by clock; epochs of different
/// threads are incomparable without a vector clock.
impl PartialOrd for Epoch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.tid() == other.tid() {
            Some(self.clock().cmp(&other.clock()))
        } else {
            None
        }
    }
}

impl fmt::Debug for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Epoch(none)")
        } else {
            write!(f, "Epoch({}@{})", self.tid(), self.clock())
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.tid(), self.clock())
    }
}
