/*!
 * Shard Configuration
 *
 * CPU-topology-aware shard counts for the shadow tables. Location cells see
 * every instrumented access and get the most shards; sync-object cells are
 * touched far less often.
 *
 * - Power-of-2 shards (required by DashMap)
 * - CPU-proportional scaling
 * - Computed once, then read from a OnceLock
 */

use std::sync::OnceLock;

static SHARD_MANAGER: OnceLock<ShardManager> = OnceLock::new();

/// Hardware-aware shard configuration calculator
#[derive(Debug, Clone)]
pub struct ShardManager {
    cpu_count: usize,
}

impl ShardManager {
    fn instance() -> &'static Self {
        SHARD_MANAGER.get_or_init(|| {
            let cpu_count = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or_else(|_| {
                    tracing::warn!("Failed to detect CPU count, defaulting to 8");
                    8
                });

            tracing::debug!(cpu_count, "ShardManager initialized");

            Self { cpu_count }
        })
    }

    /// Shard count for a given workload profile
    pub fn shards(profile: WorkloadProfile) -> usize {
        let base = Self::instance().cpu_count;

        let multiplier = match profile {
            // Per-address cells: hit on every sampled access
            WorkloadProfile::HighContention => 4,
            // Sync-object cells: hit on lock/channel/wait-group events
            WorkloadProfile::MediumContention => 2,
            // Side tables (stack capture)
            WorkloadProfile::LowContention => 1,
        };

        (base * multiplier).next_power_of_two().clamp(8, 512)
    }

    /// CPU count detected at initialization
    pub fn cpu_count() -> usize {
        Self::instance().cpu_count
    }
}

/// Workload characterization for shard count calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadProfile {
    /// 4x CPU cores
    HighContention,
    /// 2x CPU cores
    MediumContention,
    /// 1x CPU cores
    LowContention,
}
