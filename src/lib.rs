/*!
 * Race Detector Library
 * Dynamic data-race detection for instrumented programs
 *
 * The host instruments memory accesses and synchronization operations and
 * forwards them to a [`Detector`], one [`ExecutionContext`] per thread.
 * Accesses not ordered by happens-before are reported once per
 * `(kind, address, thread pair)` through a [`ReportSink`].
 */

#![cfg_attr(feature = "nightly", feature(core_intrinsics))]
#![cfg_attr(feature = "nightly", allow(internal_features))]

pub mod clock;
pub mod context;
pub mod core;
pub mod detector;
pub mod monitoring;
pub mod report;
pub mod sampling;
pub mod shadow;

// Re-exports
pub use clock::{pool_stats, Epoch, PoolStats, ThreadId, VectorClock};
pub use context::ExecutionContext;
pub use crate::core::errors::{ConfigError, DetectorError, DetectorResult};
pub use crate::core::types::{Address, Clock, RawThreadId};
pub use detector::{Detector, DetectorBuilder, DetectorOptions, OverflowStatus};
pub use monitoring::{init_tracing, try_init_tracing};
pub use report::{
    AccessInfo, AccessKind, CollectingSink, JsonLinesSink, NullSink, RaceKey, RaceKind,
    RaceRecord, ReportSink, StackCapture, StackTrace, TracingSink,
};
pub use sampling::{Sampler, SamplerStats};
pub use shadow::{LocationSnapshot, Ownership, PromotionStats, ReadStateKind, SyncSnapshot};
