/*!
 * Lock-Free Shadow Statistics
 * Atomic counters for the access hot path, snapshotted on demand
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Read/write and promotion/demotion counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionStats {
    pub total_reads: u64,
    pub total_writes: u64,
    /// Single-epoch -> shared read clock transitions
    pub promotions: u64,
    /// Shared read clock -> empty transitions (caused by a write)
    pub demotions: u64,
    /// Reads handled with a single-epoch read state
    pub fast_path_reads: u64,
    /// Reads that had to update a shared read clock
    pub slow_path_reads: u64,
    /// Cells currently holding a shared read clock
    pub promoted_cells: u64,
    /// Accesses that ended at the same-epoch check
    pub same_epoch_hits: u64,
    /// Writes that took the ownership fast path
    pub owned_writes: u64,
}

impl PromotionStats {
    /// Fraction of reads that stayed on the single-epoch path
    pub fn fast_path_ratio(&self) -> f64 {
        let handled = self.fast_path_reads + self.slow_path_reads;
        if handled == 0 {
            1.0
        } else {
            self.fast_path_reads as f64 / handled as f64
        }
    }
}

/// Atomic statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to avoid false sharing with neighbouring fields
/// - Relaxed ordering everywhere; a snapshot is not a consistent cut
#[repr(C, align(64))]
#[derive(Default)]
pub struct AtomicPromotionStats {
    total_reads: AtomicU64,
    total_writes: AtomicU64,
    promotions: AtomicU64,
    demotions: AtomicU64,
    fast_path_reads: AtomicU64,
    slow_path_reads: AtomicU64,
    promoted_cells: AtomicU64,
    same_epoch_hits: AtomicU64,
    owned_writes: AtomicU64,
}

impl AtomicPromotionStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_reads(&self) {
        self.total_reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_writes(&self) {
        self.total_writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_fast_path_reads(&self) {
        self.fast_path_reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_slow_path_reads(&self) {
        self.slow_path_reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_same_epoch(&self) {
        self.same_epoch_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_owned_writes(&self) {
        self.owned_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// A cell promoted its read state
    #[inline]
    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
        self.promoted_cells.fetch_add(1, Ordering::Relaxed);
    }

    /// A cell demoted its read state
    #[inline]
    pub fn record_demotion(&self) {
        self.demotions.fetch_add(1, Ordering::Relaxed);
        // Saturating: a reset may have zeroed the gauge under a live cell
        let _ = self
            .promoted_cells
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn snapshot(&self) -> PromotionStats {
        PromotionStats {
            total_reads: self.total_reads.load(Ordering::Relaxed),
            total_writes: self.total_writes.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            demotions: self.demotions.load(Ordering::Relaxed),
            fast_path_reads: self.fast_path_reads.load(Ordering::Relaxed),
            slow_path_reads: self.slow_path_reads.load(Ordering::Relaxed),
            promoted_cells: self.promoted_cells.load(Ordering::Relaxed),
            same_epoch_hits: self.same_epoch_hits.load(Ordering::Relaxed),
            owned_writes: self.owned_writes.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.total_reads,
            &self.total_writes,
            &self.promotions,
            &self.demotions,
            &self.fast_path_reads,
            &self.slow_path_reads,
            &self.promoted_cells,
            &self.same_epoch_hits,
            &self.owned_writes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
