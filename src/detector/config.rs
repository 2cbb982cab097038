/*!
 * Detector Configuration
 *
 * Runtime options for a detector session. Every knob has a documented
 * default in [`crate::core::limits`]; environment variables can override
 * them for tools that cannot pass options through code.
 *
 * Environment variables:
 * - `RACEDET_SAMPLE_RATE`: check one access in N (enables sampling if > 1)
 * - `RACEDET_OVERFLOW_CHECK_INTERVAL`: operations between overflow checks
 * - `RACEDET_OVERFLOW_WARN_PERCENT`: id/clock usage that triggers a warning
 * - `RACEDET_CAPTURE_STACKS`: `1`/`true` to capture stacks for reports
 * - `RACEDET_ADVANCE_ON_ACCESS`: `0`/`false` to advance clocks only at
 *   synchronization events
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{
    DEFAULT_OVERFLOW_CHECK_INTERVAL, DEFAULT_OVERFLOW_WARN_PERCENT, FULL_SAMPLE_RATE,
};
use serde::{Deserialize, Serialize};

pub const ENV_SAMPLE_RATE: &str = "RACEDET_SAMPLE_RATE";
pub const ENV_OVERFLOW_CHECK_INTERVAL: &str = "RACEDET_OVERFLOW_CHECK_INTERVAL";
pub const ENV_OVERFLOW_WARN_PERCENT: &str = "RACEDET_OVERFLOW_WARN_PERCENT";
pub const ENV_CAPTURE_STACKS: &str = "RACEDET_CAPTURE_STACKS";
pub const ENV_ADVANCE_ON_ACCESS: &str = "RACEDET_ADVANCE_ON_ACCESS";

/// Detector options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Gate memory accesses through a [`crate::sampling::Sampler`]
    pub sampling_enabled: bool,
    /// Check one access in `sample_rate` (ignored unless sampling is enabled)
    pub sample_rate: u64,
    /// Operations between two overflow checks
    pub overflow_check_interval: u64,
    /// Percentage of the thread-id / clock space that triggers a warning
    pub overflow_warn_percent: u8,
    /// Attach stacks from the installed [`crate::report::StackCapture`]
    pub capture_stacks: bool,
    /// Advance the thread's clock after every access. When off, clocks only
    /// move at synchronization events and repeated accesses between two
    /// sync points hit the same-epoch fast path.
    pub advance_on_access: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            sampling_enabled: false,
            sample_rate: FULL_SAMPLE_RATE,
            overflow_check_interval: DEFAULT_OVERFLOW_CHECK_INTERVAL,
            overflow_warn_percent: DEFAULT_OVERFLOW_WARN_PERCENT,
            capture_stacks: false,
            advance_on_access: true,
        }
    }
}

impl DetectorOptions {
    /// Sampling enabled at `rate`
    pub fn sampled(rate: u64) -> Self {
        Self {
            sampling_enabled: true,
            sample_rate: rate,
            ..Self::default()
        }
    }

    pub fn with_sampling(mut self, rate: u64) -> Self {
        self.sampling_enabled = true;
        self.sample_rate = rate;
        self
    }

    pub fn with_overflow_check_interval(mut self, interval: u64) -> Self {
        self.overflow_check_interval = interval;
        self
    }

    pub fn with_overflow_warn_percent(mut self, percent: u8) -> Self {
        self.overflow_warn_percent = percent;
        self
    }

    pub fn with_stack_capture(mut self, enabled: bool) -> Self {
        self.capture_stacks = enabled;
        self
    }

    pub fn with_advance_on_access(mut self, enabled: bool) -> Self {
        self.advance_on_access = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_enabled && self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.overflow_check_interval == 0 {
            return Err(ConfigError::InvalidCheckInterval(self.overflow_check_interval));
        }
        if self.overflow_warn_percent == 0 || self.overflow_warn_percent > 100 {
            return Err(ConfigError::InvalidWarnPercent(self.overflow_warn_percent));
        }
        Ok(())
    }

    /// Defaults overlaid with the `RACEDET_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup` (name -> raw value)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(rate) = parse_u64(&lookup, ENV_SAMPLE_RATE)? {
            options.sampling_enabled = rate > FULL_SAMPLE_RATE;
            options.sample_rate = rate;
        }
        if let Some(interval) = parse_u64(&lookup, ENV_OVERFLOW_CHECK_INTERVAL)? {
            options.overflow_check_interval = interval;
        }
        if let Some(percent) = parse_u64(&lookup, ENV_OVERFLOW_WARN_PERCENT)? {
            options.overflow_warn_percent = u8::try_from(percent)
                .map_err(|_| invalid(ENV_OVERFLOW_WARN_PERCENT, &percent.to_string()))?;
        }
        if let Some(capture) = parse_flag(&lookup, ENV_CAPTURE_STACKS)? {
            options.capture_stacks = capture;
        }
        if let Some(advance) = parse_flag(&lookup, ENV_ADVANCE_ON_ACCESS)? {
            options.advance_on_access = advance;
        }

        options.validate()?;
        Ok(options)
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_u64<F>(lookup: &F, name: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(name, &raw)),
    }
}

fn parse_flag<F>(lookup: &F, name: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(invalid(name, &raw)),
        },
    }
}
