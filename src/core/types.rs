/*!
 * Core Types
 * Common types used across the detector
 */

/// Address of an instrumented memory location or synchronization object
///
/// Opaque to the detector: only equality and hashing are used, so callers
/// may pass real pointers or any other stable identifier.
pub type Address = usize;

/// Raw thread identifier as handed over by the instrumentation layer
///
/// Narrowed to [`crate::clock::ThreadId`] (16 bits) when a context is
/// created.
pub type RawThreadId = u64;

/// Logical clock value (only the low 48 bits are representable in an epoch)
pub type Clock = u64;
