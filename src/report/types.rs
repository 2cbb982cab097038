/*!
 * Report Types
 * Structured race records handed to the reporting collaborator
 */

use crate::clock::{Epoch, ThreadId};
use crate::core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "read"),
            AccessKind::Write => write!(f, "write"),
        }
    }
}

/// Which pair of accesses raced, named `previous-current`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceKind {
    /// Unordered write, then write
    WriteWrite,
    /// Unordered read, then write
    ReadWrite,
    /// Unordered write, then read
    WriteRead,
}

impl RaceKind {
    pub const fn previous_access(self) -> AccessKind {
        match self {
            RaceKind::WriteWrite | RaceKind::WriteRead => AccessKind::Write,
            RaceKind::ReadWrite => AccessKind::Read,
        }
    }

    pub const fn current_access(self) -> AccessKind {
        match self {
            RaceKind::WriteWrite | RaceKind::ReadWrite => AccessKind::Write,
            RaceKind::WriteRead => AccessKind::Read,
        }
    }
}

impl fmt::Display for RaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceKind::WriteWrite => write!(f, "write-write"),
            RaceKind::ReadWrite => write!(f, "read-write"),
            RaceKind::WriteRead => write!(f, "write-read"),
        }
    }
}

/// Unsymbolized call stack as raw program counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackTrace(Arc<[usize]>);

impl StackTrace {
    pub fn new(frames: impl Into<Arc<[usize]>>) -> Self {
        Self(frames.into())
    }

    pub fn frames(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Order-independent identity of a race: `(kind, address, lower tid, higher tid)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaceKey {
    pub kind: RaceKind,
    pub address: Address,
    pub low: ThreadId,
    pub high: ThreadId,
}

impl RaceKey {
    pub fn new(kind: RaceKind, address: Address, a: ThreadId, b: ThreadId) -> Self {
        Self {
            kind,
            address,
            low: a.min(b),
            high: a.max(b),
        }
    }
}

/// One side of a race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessInfo {
    pub kind: AccessKind,
    pub address: Address,
    pub thread_id: ThreadId,
    pub epoch: Epoch,
    pub stack: Option<StackTrace>,
}

/// A detected race, current access vs. the conflicting earlier one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub kind: RaceKind,
    pub current: AccessInfo,
    pub previous: AccessInfo,
    pub key: RaceKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_symmetric() {
        let a = RaceKey::new(RaceKind::WriteRead, 0x40, ThreadId(1), ThreadId(2));
        let b = RaceKey::new(RaceKind::WriteRead, 0x40, ThreadId(2), ThreadId(1));
        assert_eq!(a, b);
        assert_eq!(a.low, ThreadId(1));
        assert_eq!(a.high, ThreadId(2));
    }

    #[test]
    fn test_key_distinguishes_kind_and_address() {
        let base = RaceKey::new(RaceKind::WriteRead, 0x40, ThreadId(1), ThreadId(2));
        assert_ne!(base, RaceKey::new(RaceKind::WriteWrite, 0x40, ThreadId(1), ThreadId(2)));
        assert_ne!(base, RaceKey::new(RaceKind::WriteRead, 0x48, ThreadId(1), ThreadId(2)));
    }

    #[test]
    fn test_kind_sides() {
        assert_eq!(RaceKind::ReadWrite.previous_access(), AccessKind::Read);
        assert_eq!(RaceKind::ReadWrite.current_access(), AccessKind::Write);
        assert_eq!(RaceKind::WriteRead.previous_access(), AccessKind::Write);
        assert_eq!(RaceKind::WriteRead.current_access(), AccessKind::Read);
        assert_eq!(RaceKind::WriteWrite.to_string(), "write-write");
    }

    #[test]
    fn test_record_serializes() {
        let key = RaceKey::new(RaceKind::WriteWrite, 0x10, ThreadId(3), ThreadId(1));
        let record = RaceRecord {
            kind: RaceKind::WriteWrite,
            current: AccessInfo {
                kind: AccessKind::Write,
                address: 0x10,
                thread_id: ThreadId(3),
                epoch: Epoch::new(ThreadId(3), 2),
                stack: Some(StackTrace::new(vec![0x1000, 0x2000])),
            },
            previous: AccessInfo {
                kind: AccessKind::Write,
                address: 0x10,
                thread_id: ThreadId(1),
                epoch: Epoch::new(ThreadId(1), 7),
                stack: None,
            },
            key,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"write_write\""));
        let back: RaceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
