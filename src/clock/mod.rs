/*!
 * Logical Time
 * Epochs, vector clocks and the clock pool
 */

pub mod epoch;
pub mod pool;
pub mod thread_id;
pub mod vector_clock;

pub use epoch::Epoch;
pub use pool::{acquire, pool_stats, release, PoolStats};
pub use thread_id::ThreadId;
pub use vector_clock::VectorClock;
