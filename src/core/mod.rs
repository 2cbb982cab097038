/*!
 * Core Module
 * Fundamental detector types, limits and error handling
 */

pub mod errors;
pub mod hints;
pub mod limits;
pub mod shard_manager;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use hints::*;
pub use shard_manager::{ShardManager, WorkloadProfile};
pub use types::*;
