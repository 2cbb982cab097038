/*!
 * Tracing Setup
 * Subscriber installation for the detector's structured logs
 *
 * The library only emits `tracing` events. Embedders that already run a
 * subscriber need none of this; standalone harnesses and tests call
 * [`init_tracing`] or [`try_init_tracing`] once at startup.
 */

use crate::core::errors::{DetectorError, DetectorResult};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects JSON output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "RACEDET_TRACE_JSON";

fn json_requested() -> bool {
    std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Install the global subscriber, failing if one is already set
///
/// Environment variables:
/// - RUST_LOG: log filter (default: info)
/// - RACEDET_TRACE_JSON: JSON output (default: false)
pub fn try_init_tracing() -> DetectorResult<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let use_json = json_requested();
    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .with_file(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
    };

    result.map_err(|e| DetectorError::TracingInit(e.to_string()))?;
    info!(json = use_json, "Race detector tracing initialized");
    Ok(())
}

/// Install the global subscriber, ignoring an already-installed one
pub fn init_tracing() {
    if let Err(e) = try_init_tracing() {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        init_tracing();
        assert!(matches!(
            try_init_tracing(),
            Err(DetectorError::TracingInit(_))
        ));
    }
}
