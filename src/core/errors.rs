/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 *
 * Detected races are not errors: they flow to a report sink as data. The
 * types here cover misconfiguration and environment setup only.
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detector option errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid sample rate: {0}")]
    #[diagnostic(
        code(config::invalid_sample_rate),
        help("Sample rate must be at least 1 (1 checks every access).")
    )]
    InvalidSampleRate(u64),

    #[error("Invalid overflow check interval: {0}")]
    #[diagnostic(
        code(config::invalid_check_interval),
        help("The overflow check interval is an operation count and must be at least 1.")
    )]
    InvalidCheckInterval(u64),

    #[error("Invalid overflow warning percentage: {0}")]
    #[diagnostic(
        code(config::invalid_warn_percent),
        help("Use a percentage between 1 and 100.")
    )]
    InvalidWarnPercent(u8),

    #[error("Invalid value {value:?} for environment variable {name}")]
    #[diagnostic(
        code(config::invalid_env),
        help("Check the variable is a plain unsigned integer (or true/false for flags).")
    )]
    InvalidEnv { name: String, value: String },
}

/// Unified detector error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum DetectorError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Tracing initialization failed: {0}")]
    #[diagnostic(
        code(detector::tracing_init),
        help("A global tracing subscriber is probably already installed.")
    )]
    TracingInit(String),
}

/// Common result type for detector setup operations
pub type DetectorResult<T> = Result<T, DetectorError>;
