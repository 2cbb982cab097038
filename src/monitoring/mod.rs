/*!
 * Monitoring
 * Logging setup for hosts that run the detector standalone
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing, ENV_TRACE_JSON};
