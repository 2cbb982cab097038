/*!
 * Thread Identifiers
 * 16-bit thread ids as stored inside packed epochs
 */

use crate::core::limits::MAX_THREAD_ID;
use crate::core::types::RawThreadId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Detector-side thread id (16 bits, see [`crate::core::limits::TID_BITS`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u16);

impl ThreadId {
    /// Largest representable id
    pub const MAX: ThreadId = ThreadId(MAX_THREAD_ID as u16);

    #[inline]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Narrow a raw id, saturating at [`ThreadId::MAX`]
    ///
    /// Returns the id and whether it had to be clamped. Clamped threads share
    /// a clock slot, which costs precision but never corrupts ordering.
    #[inline]
    pub const fn from_raw(raw: RawThreadId) -> (Self, bool) {
        if raw > MAX_THREAD_ID {
            (Self::MAX, true)
        } else {
            (Self(raw as u16), false)
        }
    }

    #[inline(always)]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl From<u16> for ThreadId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}
