/*!
 * Shadow Tables
 * Concurrent address -> cell maps with get-or-create semantics
 */

use crate::core::types::Address;
use crate::core::{ShardManager, WorkloadProfile};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

/// Lazily populated map from address to shadow cell
///
/// Cells are handed out as `Arc`s so the shard guard is released before any
/// per-cell work starts; a cell outlives a concurrent `clear` for as long as
/// an in-flight event still holds it.
pub struct ShadowTable<T> {
    cells: DashMap<Address, Arc<T>, RandomState>,
}

impl<T: Default> ShadowTable<T> {
    pub fn new(profile: WorkloadProfile) -> Self {
        Self {
            cells: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                ShardManager::shards(profile),
            ),
        }
    }

    /// Existing cell, or a fresh default one inserted atomically
    ///
    /// Two threads racing on first access both get the same cell.
    #[inline]
    pub fn get_or_create(&self, addr: Address) -> Arc<T> {
        if let Some(cell) = self.cells.get(&addr) {
            return Arc::clone(cell.value());
        }
        Arc::clone(self.cells.entry(addr).or_default().value())
    }

    #[inline]
    pub fn get(&self, addr: Address) -> Option<Arc<T>> {
        self.cells.get(&addr).map(|cell| Arc::clone(cell.value()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&self) {
        self.cells.clear();
    }
}
