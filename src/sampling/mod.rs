/*!
 * Access Sampling
 * Deterministic admission control for the access hot path
 *
 * Strategy: a shared atomic counter is bumped on every access and the access
 * is checked iff `counter % rate == 0`. No RNG, no thread-local state, and a
 * uniform 1/rate selection over any long enough stream.
 */

use crate::core::limits::FULL_SAMPLE_RATE;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Sampler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerStats {
    pub total: u64,
    pub sampled: u64,
    pub skipped: u64,
}

impl SamplerStats {
    /// Observed fraction of accesses that were checked
    pub fn sampled_fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.sampled as f64 / self.total as f64
        }
    }
}

/// Counter-based sampler
///
/// # Performance
/// - Cache-line aligned: every sampled access hits `evaluated`
/// - Disabled samplers answer with one branch and touch no shared state
#[repr(C, align(64))]
pub struct Sampler {
    enabled: bool,
    rate: u64,
    evaluated: AtomicU64,
    sampled: AtomicU64,
}

impl Sampler {
    /// Sampler checking one access in `rate`; a rate of 0 is treated as 1
    pub fn new(rate: u64) -> Self {
        Self {
            enabled: true,
            rate: rate.max(FULL_SAMPLE_RATE),
            evaluated: AtomicU64::new(0),
            sampled: AtomicU64::new(0),
        }
    }

    /// Sampler that admits everything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            rate: FULL_SAMPLE_RATE,
            evaluated: AtomicU64::new(0),
            sampled: AtomicU64::new(0),
        }
    }

    /// Decide whether to check this access (fast path)
    #[inline(always)]
    pub fn should_sample(&self) -> bool {
        if !self.enabled {
            return true;
        }

        let n = self.evaluated.fetch_add(1, Ordering::Relaxed);
        if n % self.rate == 0 {
            self.sampled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn rate(&self) -> u64 {
        self.rate
    }

    /// Probability that at least one of `accesses_per_race` conflicting
    /// accesses gets checked: `1 - (1 - 1/rate)^n`
    pub fn expected_detection_rate(&self, accesses_per_race: u64) -> f64 {
        if !self.enabled || self.rate <= FULL_SAMPLE_RATE {
            return 1.0;
        }
        let miss = 1.0 - 1.0 / self.rate as f64;
        let exponent = i32::try_from(accesses_per_race).unwrap_or(i32::MAX);
        1.0 - miss.powi(exponent)
    }

    pub fn stats(&self) -> SamplerStats {
        let total = self.evaluated.load(Ordering::Relaxed);
        let sampled = self.sampled.load(Ordering::Relaxed);
        SamplerStats {
            total,
            sampled,
            skipped: total.saturating_sub(sampled),
        }
    }

    pub fn reset(&self) {
        self.evaluated.store(0, Ordering::Relaxed);
        self.sampled.store(0, Ordering::Relaxed);
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::disabled()
    }
}
