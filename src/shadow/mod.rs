/*!
 * Shadow State
 * Per-address and per-sync-object metadata plus the tables that hold them
 */

pub mod location;
pub mod stats;
pub mod sync;
pub mod table;

pub use location::{
    AccessOutcome, Conflict, LocationShadow, LocationSnapshot, Ownership, ReadState, ReadStateKind,
};
pub use stats::{AtomicPromotionStats, PromotionStats};
pub use sync::{SyncObjectShadow, SyncSnapshot};
pub use table::ShadowTable;
