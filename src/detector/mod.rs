/*!
 * Race Detector
 *
 * Hybrid happens-before race detection over an event stream:
 * - Epoch fast path: a location read by one thread at a time needs a single
 *   epoch comparison
 * - Adaptive read state: promoted to a vector clock only while reads are
 *   genuinely concurrent, demoted by the next write
 * - Ownership fast path: a thread repeatedly writing its own data skips the
 *   happens-before check entirely
 *
 * A [`Detector`] is an explicit session object. Instrumentation holds one
 * (usually behind an `Arc`) and calls its event methods from every thread,
 * each time passing that thread's [`ExecutionContext`].
 *
 * # Example
 *
 * ```
 * use racedet::{CollectingSink, Detector, ExecutionContext};
 * use std::sync::Arc;
 *
 * let sink = Arc::new(CollectingSink::new());
 * let detector = Detector::builder().with_sink(sink.clone()).build().unwrap();
 *
 * let mut main = ExecutionContext::start(0);
 * let mut worker = main.spawn(1);
 *
 * detector.on_write(0x1000, &mut main);
 * detector.on_read(0x1000, &mut worker);
 *
 * assert_eq!(detector.races_detected(), 1);
 * assert_eq!(sink.len(), 1);
 * ```
 */

mod access;
mod builder;
pub mod config;
pub mod dedup;
pub mod overflow;
mod sync;

pub use builder::DetectorBuilder;
pub use config::DetectorOptions;
pub use dedup::RaceLog;
pub use overflow::{OverflowGuard, OverflowStatus};

use crate::core::errors::DetectorResult;
use crate::core::types::Address;
use crate::core::{ShardManager, WorkloadProfile};
use crate::report::{RaceKey, ReportSink, StackCapture, StackTrace, TracingSink};
use crate::sampling::{Sampler, SamplerStats};
use crate::shadow::{
    AtomicPromotionStats, LocationShadow, LocationSnapshot, PromotionStats, ShadowTable,
    SyncObjectShadow, SyncSnapshot,
};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Race detection session
pub struct Detector {
    options: DetectorOptions,
    locations: ShadowTable<LocationShadow>,
    sync_objects: ShadowTable<SyncObjectShadow>,
    sampler: Option<Sampler>,
    overflow: OverflowGuard,
    races: RaceLog,
    stats: AtomicPromotionStats,
    sink: Arc<dyn ReportSink>,
    stack_capture: Option<Arc<dyn StackCapture>>,
    write_stacks: DashMap<Address, StackTrace, RandomState>,
}

impl Detector {
    /// Detector with default options (no sampling) reporting through `tracing`
    pub fn new() -> Self {
        Self::assemble(DetectorOptions::default(), Arc::new(TracingSink), None)
    }

    /// Detector with explicit options, validated first
    pub fn with_options(options: DetectorOptions) -> DetectorResult<Self> {
        Self::builder().with_options(options).build()
    }

    pub fn builder() -> DetectorBuilder {
        DetectorBuilder::new()
    }

    pub(crate) fn assemble(
        options: DetectorOptions,
        sink: Arc<dyn ReportSink>,
        stack_capture: Option<Arc<dyn StackCapture>>,
    ) -> Self {
        let sampler = options
            .sampling_enabled
            .then(|| Sampler::new(options.sample_rate));

        info!(
            sampling = options.sampling_enabled,
            sample_rate = options.sample_rate,
            overflow_check_interval = options.overflow_check_interval,
            capture_stacks = options.capture_stacks && stack_capture.is_some(),
            advance_on_access = options.advance_on_access,
            cpus = ShardManager::cpu_count(),
            "Race detector initialized"
        );

        Self {
            overflow: OverflowGuard::new(
                options.overflow_check_interval,
                options.overflow_warn_percent,
            ),
            locations: ShadowTable::new(WorkloadProfile::HighContention),
            sync_objects: ShadowTable::new(WorkloadProfile::MediumContention),
            sampler,
            races: RaceLog::new(),
            stats: AtomicPromotionStats::new(),
            sink,
            stack_capture: stack_capture.filter(|_| options.capture_stacks),
            write_stacks: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                ShardManager::shards(WorkloadProfile::LowContention),
            ),
            options,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Distinct races reported so far
    #[inline]
    pub fn races_detected(&self) -> u64 {
        self.races.count()
    }

    /// Keys of every distinct race reported so far
    pub fn race_keys(&self) -> Vec<RaceKey> {
        self.races.keys()
    }

    pub fn promotion_stats(&self) -> PromotionStats {
        self.stats.snapshot()
    }

    /// `None` when sampling is disabled
    pub fn sampler_stats(&self) -> Option<SamplerStats> {
        self.sampler.as_ref().map(Sampler::stats)
    }

    /// Probability of catching a race that spans `accesses_per_race`
    /// conflicting accesses under the current sampling rate
    pub fn expected_detection_rate(&self, accesses_per_race: u64) -> f64 {
        self.sampler
            .as_ref()
            .map_or(1.0, |s| s.expected_detection_rate(accesses_per_race))
    }

    pub fn overflow_status(&self) -> OverflowStatus {
        self.overflow.status()
    }

    pub fn tracked_locations(&self) -> usize {
        self.locations.len()
    }

    pub fn tracked_sync_objects(&self) -> usize {
        self.sync_objects.len()
    }

    pub fn location_snapshot(&self, addr: Address) -> Option<LocationSnapshot> {
        self.locations.get(addr).map(|cell| cell.snapshot())
    }

    pub fn sync_snapshot(&self, addr: Address) -> Option<SyncSnapshot> {
        self.sync_objects.get(addr).map(|cell| cell.snapshot())
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Drop all shadow state, counters and the dedup set
    ///
    /// Must not run concurrently with event calls: an in-flight event may
    /// finish against a cell that is no longer in the table.
    pub fn reset(&self) {
        self.locations.clear();
        self.sync_objects.clear();
        self.write_stacks.clear();
        self.races.clear();
        self.stats.reset();
        self.overflow.reset();
        if let Some(sampler) = &self.sampler {
            sampler.reset();
        }
        debug!("Race detector reset");
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}
