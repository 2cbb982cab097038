/*!
 * Vector Clocks
 *
 * Per-thread logical-clock vectors for full happens-before comparison.
 *
 * # Representation
 *
 * A dense `Vec<Clock>` indexed by thread id whose length is one past the
 * highest thread id ever set. Components past the end read as 0, so join
 * and compare only walk the prefix either operand actually populated.
 *
 * ```text
 * T0 context: [5, 2, 3]  (T0 is at 5, last saw T1 at 2, T2 at 3)
 * T1 context: [4, 7]     (T1 is at 7, last saw T0 at 4, never saw T2)
 * ```
 */

use super::ThreadId;
use crate::core::limits::{INITIAL_CLOCK_CAPACITY, MAX_CLOCK};
use crate::core::types::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical-clock vector
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock {
    clocks: Vec<Clock>,
}

impl VectorClock {
    /// Empty clock (every component 0), no allocation
    #[inline]
    pub const fn new() -> Self {
        Self { clocks: Vec::new() }
    }

    /// Empty clock with room for a few threads
    pub fn with_capacity(threads: usize) -> Self {
        Self {
            clocks: Vec::with_capacity(threads.max(INITIAL_CLOCK_CAPACITY)),
        }
    }

    #[inline(always)]
    pub fn get(&self, tid: ThreadId) -> Clock {
        self.clocks.get(tid.as_usize()).copied().unwrap_or(0)
    }

    /// Overwrite one component, growing the sparse bound if needed
    #[inline]
    pub fn set(&mut self, tid: ThreadId, value: Clock) {
        let idx = tid.as_usize();
        if idx >= self.clocks.len() {
            self.clocks.resize(idx + 1, 0);
        }
        self.clocks[idx] = value.min(MAX_CLOCK);
    }

    /// Advance the owning thread's own component, saturating at [`MAX_CLOCK`]
    ///
    /// Returns the new value.
    #[inline]
    pub fn increment(&mut self, tid: ThreadId) -> Clock {
        let idx = tid.as_usize();
        if idx >= self.clocks.len() {
            self.clocks.resize(idx + 1, 0);
        }
        let slot = &mut self.clocks[idx];
        if *slot < MAX_CLOCK {
            *slot += 1;
        }
        *slot
    }

    /// Component-wise max
    pub fn join(&mut self, other: &VectorClock) {
        if other.clocks.len() > self.clocks.len() {
            self.clocks.resize(other.clocks.len(), 0);
        }
        for (mine, theirs) in self.clocks.iter_mut().zip(other.clocks.iter()) {
            if *theirs > *mine {
                *mine = *theirs;
            }
        }
    }

    /// Replace every component with `other`'s (snapshot copy)
    ///
    /// Reuses the existing allocation.
    pub fn copy_from(&mut self, other: &VectorClock) {
        self.clocks.clear();
        self.clocks.extend_from_slice(&other.clocks);
    }

    /// `self[t] <= other[t]` for every thread
    ///
    /// Only `self`'s populated prefix can violate the relation, so that is
    /// all that gets scanned.
    pub fn less_or_equal(&self, other: &VectorClock) -> bool {
        self.clocks
            .iter()
            .enumerate()
            .all(|(idx, &c)| c <= other.clocks.get(idx).copied().unwrap_or(0))
    }

    /// Everything `self` has observed is visible to `other`
    ///
    /// Non-strict: a clock happens-before itself. This is the relation the
    /// race check needs ("already synchronized"), not the strict order.
    #[inline]
    pub fn happens_before(&self, other: &VectorClock) -> bool {
        self.less_or_equal(other)
    }

    /// Neither clock is covered by the other
    pub fn concurrent(&self, other: &VectorClock) -> bool {
        !self.less_or_equal(other) && !other.less_or_equal(self)
    }

    /// First thread whose component in `self` is not covered by `other`
    pub fn first_uncovered(&self, other: &VectorClock) -> Option<(ThreadId, Clock)> {
        self.clocks
            .iter()
            .enumerate()
            .find(|&(idx, &c)| c > other.clocks.get(idx).copied().unwrap_or(0))
            .map(|(idx, &c)| (ThreadId(idx as u16), c))
    }

    /// Highest thread id with a slot (the sparse bound)
    #[inline]
    pub fn max_tid(&self) -> Option<ThreadId> {
        self.clocks.len().checked_sub(1).map(|idx| ThreadId(idx as u16))
    }

    /// Number of slots currently populated
    #[inline]
    pub fn width(&self) -> usize {
        self.clocks.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.clocks.capacity()
    }

    /// Zero every component, keeping the allocation
    #[inline]
    pub fn clear(&mut self) {
        self.clocks.clear();
    }

    pub fn is_zero(&self) -> bool {
        self.clocks.iter().all(|&c| c == 0)
    }

    /// Largest single component (used by the overflow guard)
    pub fn max_component(&self) -> Clock {
        self.clocks.iter().copied().max().unwrap_or(0)
    }

    /// Non-zero components in thread order
    pub fn iter(&self) -> impl Iterator<Item = (ThreadId, Clock)> + '_ {
        self.clocks
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != 0)
            .map(|(idx, &c)| (ThreadId(idx as u16), c))
    }
}

/// Equality ignores trailing zero slots: `[1, 0]` equals `[1]`.
impl PartialEq for VectorClock {
    fn eq(&self, other: &Self) -> bool {
        let len = self.clocks.len().max(other.clocks.len());
        (0..len).all(|idx| {
            self.clocks.get(idx).copied().unwrap_or(0) == other.clocks.get(idx).copied().unwrap_or(0)
        })
    }
}

impl Eq for VectorClock {}

impl fmt::Debug for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(ThreadId, Clock)> for VectorClock {
    fn from_iter<I: IntoIterator<Item = (ThreadId, Clock)>>(iter: I) -> Self {
        let mut vc = VectorClock::new();
        for (tid, clock) in iter {
            vc.set(tid, clock);
        }
        vc
    }
}
