/*!
 * Detector Limits and Constants
 *
 * Centralized location for the bit layout of logical time and for the
 * tuning knobs of the detector. Performance-critical constants are marked
 * with [PERF].
 */

// =============================================================================
// LOGICAL TIME LAYOUT
// =============================================================================

/// Bits used for the thread id inside a packed epoch
pub const TID_BITS: u32 = 16;

/// Bits used for the logical clock inside a packed epoch
pub const CLOCK_BITS: u32 = 64 - TID_BITS;

/// Largest representable thread id (65535)
pub const MAX_THREAD_ID: u64 = (1 << TID_BITS) - 1;

/// Largest representable logical clock (2^48 - 1)
/// Clocks saturate here instead of wrapping into the thread id bits
pub const MAX_CLOCK: u64 = (1 << CLOCK_BITS) - 1;

/// Mask selecting the clock bits of a packed epoch
pub const CLOCK_MASK: u64 = MAX_CLOCK;

/// First clock value of every thread (0 is reserved for "never happened")
pub const INITIAL_CLOCK: u64 = 1;

// =============================================================================
// OVERFLOW GUARD
// =============================================================================

/// Operations between two overflow checks
/// [PERF] Keeps the check off the per-access path
pub const DEFAULT_OVERFLOW_CHECK_INTERVAL: u64 = 10_000;

/// Percentage of the id/clock space after which a one-time warning fires
pub const DEFAULT_OVERFLOW_WARN_PERCENT: u8 = 90;

// =============================================================================
// SAMPLING
// =============================================================================

/// Sample rate meaning "check every access"
pub const FULL_SAMPLE_RATE: u64 = 1;

// =============================================================================
// CLOCK POOL
// =============================================================================

/// Max recycled clocks kept per thread
/// [PERF] Small enough to stay in cache, large enough for fork bursts
pub const LOCAL_CLOCK_POOL_SIZE: usize = 16;

/// Capacity of the shared (cross-thread) clock free list
pub const SHARED_CLOCK_POOL_SIZE: usize = 256;

/// Initial component capacity reserved for a freshly allocated clock
pub const INITIAL_CLOCK_CAPACITY: usize = 8;

/// Recycled clocks wider than this are dropped instead of pooled
pub const MAX_POOLED_CLOCK_WIDTH: usize = 4096;
