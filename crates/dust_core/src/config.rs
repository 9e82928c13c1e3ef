//! Effect configuration.
//!
//! Every field has a default matching the shipped effect, so an empty TOML
//! document is a valid configuration:
//!
//! ```toml
//! session_budget_ms = 2000
//! watchdog_ms = 2200
//! time_scale = 0.65
//! time_wrap = 1000.0
//! max_delta_factor = 4.0
//! pause_poll_ms = 1000
//! fallback_refresh_rate = 60.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::pacing::FALLBACK_REFRESH_RATE;
use crate::session::{DEFAULT_TIME_SCALE, DEFAULT_TIME_WRAP};

/// Tunables for one effect run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectConfig {
    /// Wall-clock budget of the render loop.
    pub session_budget_ms: u64,
    /// Delay after which the host forces teardown.
    pub watchdog_ms: u64,
    /// Simulation speed relative to wall clock.
    pub time_scale: f32,
    /// Simulation time wraps to zero past this value.
    pub time_wrap: f32,
    /// Upper delta bound, in display frames.
    pub max_delta_factor: f64,
    /// Sleep step while paused.
    pub pause_poll_ms: u64,
    /// Refresh rate used when the host reports none.
    pub fallback_refresh_rate: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            session_budget_ms: 2_000,
            watchdog_ms: 2_200,
            time_scale: DEFAULT_TIME_SCALE,
            time_wrap: DEFAULT_TIME_WRAP,
            max_delta_factor: 4.0,
            pause_poll_ms: 1_000,
            fallback_refresh_rate: FALLBACK_REFRESH_RATE,
        }
    }
}

impl EffectConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not validate.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_budget_ms == 0 {
            return Err(ConfigError::Invalid("session_budget_ms must be positive".into()));
        }
        if self.watchdog_ms < self.session_budget_ms {
            return Err(ConfigError::Invalid(format!(
                "watchdog_ms ({}) must not be shorter than session_budget_ms ({})",
                self.watchdog_ms, self.session_budget_ms
            )));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(ConfigError::Invalid("time_scale must be positive".into()));
        }
        if !(self.time_wrap.is_finite() && self.time_wrap > 0.0) {
            return Err(ConfigError::Invalid("time_wrap must be positive".into()));
        }
        if !(self.max_delta_factor.is_finite() && self.max_delta_factor >= 1.0) {
            return Err(ConfigError::Invalid("max_delta_factor must be at least 1".into()));
        }
        if self.pause_poll_ms == 0 {
            return Err(ConfigError::Invalid("pause_poll_ms must be positive".into()));
        }
        if !(self.fallback_refresh_rate.is_finite() && self.fallback_refresh_rate > 0.0) {
            return Err(ConfigError::Invalid("fallback_refresh_rate must be positive".into()));
        }
        Ok(())
    }

    /// Session budget as a duration.
    #[must_use]
    pub const fn session_budget(&self) -> Duration {
        Duration::from_millis(self.session_budget_ms)
    }

    /// Watchdog delay as a duration.
    #[must_use]
    pub const fn watchdog(&self) -> Duration {
        Duration::from_millis(self.watchdog_ms)
    }

    /// Pause poll step as a duration.
    #[must_use]
    pub const fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }

    /// Picks the host refresh rate, or the fallback if it is unusable.
    #[must_use]
    pub fn refresh_rate_or_fallback(&self, reported: f32) -> f32 {
        if reported.is_finite() && reported > 0.0 {
            reported
        } else {
            self.fallback_refresh_rate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = EffectConfig::from_toml_str("").unwrap();
        assert_eq!(config, EffectConfig::default());
        assert_eq!(config.session_budget(), Duration::from_millis(2_000));
        assert_eq!(config.watchdog(), Duration::from_millis(2_200));
    }

    #[test]
    fn test_partial_override() {
        let config = EffectConfig::from_toml_str("session_budget_ms = 500\nwatchdog_ms = 700").unwrap();
        assert_eq!(config.session_budget_ms, 500);
        assert_eq!(config.watchdog_ms, 700);
        assert!((config.time_scale - 0.65).abs() < f32::EPSILON);
    }

    #[test]
    fn test_watchdog_shorter_than_budget_rejected() {
        let err = EffectConfig::from_toml_str("watchdog_ms = 100").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EffectConfig::from_toml_str("particles = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_refresh_rate_fallback() {
        let config = EffectConfig::default();
        assert!((config.refresh_rate_or_fallback(120.0) - 120.0).abs() < f32::EPSILON);
        assert!((config.refresh_rate_or_fallback(0.0) - 60.0).abs() < f32::EPSILON);
    }
}
