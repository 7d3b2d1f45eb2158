//! # Runtime and per-instance configuration.
//!
//! Provides two settings structs:
//! - [`DirectorConfig`] process-wide knobs for the [`Director`](crate::Director);
//! - [`SequenceConfig`] the flags an instance is created with.
//!
//! Both are plain pub-field structs with sensible defaults and can be loaded
//! from JSON documents (missing fields fall back to defaults).
//!
//! ## Sentinel values
//! - `time_scale = 0.0` → scaled time is frozen (`Wait::Seconds` and `ScaledDelay` stall)

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Global configuration for the director.
///
/// ## Field semantics
/// - `time_scale`: multiplier applied to every frame delta for scaled time (finite, `>= 0`)
/// - `auto_finalize`: finalize instances as soon as their destruction is requested
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Multiplier for scaled time.
    ///
    /// Unscaled (realtime) waits are never affected.
    pub time_scale: f64,

    /// When set, destruction requests deregister the instance immediately.
    ///
    /// Destroyed ids are still reported through
    /// [`Director::drain_destroy_requests`](crate::Director::drain_destroy_requests)
    /// so the host can drop its own objects.
    pub auto_finalize: bool,
}

impl DirectorConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(doc)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_time_scale(self.time_scale)
    }
}

impl Default for DirectorConfig {
    /// Default configuration:
    ///
    /// - `time_scale = 1.0` (scaled time follows realtime)
    /// - `auto_finalize = false` (the host calls `finalize`)
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            auto_finalize: false,
        }
    }
}

/// Flags an instance is created with. Read-only once the instance is spawned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Run Execute on the first tick after the instance is registered.
    pub execute_on_start: bool,
    /// Re-execute after completion (and after `halt(obey_loop = true)`).
    #[serde(alias = "loop")]
    pub loop_on_complete: bool,
    /// Request destruction of the owning object on completion.
    pub destroy_on_complete: bool,
}

impl SequenceConfig {
    /// Parses flags from a JSON document.
    ///
    /// # Example
    /// ```
    /// use stagehand::SequenceConfig;
    ///
    /// let cfg = SequenceConfig::from_json(r#"{ "execute_on_start": true, "loop": true }"#).unwrap();
    /// assert!(cfg.execute_on_start && cfg.loop_on_complete);
    /// assert!(!cfg.destroy_on_complete);
    /// ```
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(doc)?)
    }

    /// Returns a copy with `execute_on_start` set.
    pub fn with_execute_on_start(mut self, on: bool) -> Self {
        self.execute_on_start = on;
        self
    }

    /// Returns a copy with `loop_on_complete` set.
    pub fn with_loop(mut self, on: bool) -> Self {
        self.loop_on_complete = on;
        self
    }

    /// Returns a copy with `destroy_on_complete` set.
    pub fn with_destroy_on_complete(mut self, on: bool) -> Self {
        self.destroy_on_complete = on;
        self
    }
}

pub(crate) fn validate_time_scale(scale: f64) -> Result<(), ConfigError> {
    if scale.is_finite() && scale >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeScale { scale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_director_defaults() {
        let cfg = DirectorConfig::default();
        assert_eq!(cfg.time_scale, 1.0);
        assert!(!cfg.auto_finalize);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_director_from_json_partial() {
        let cfg = DirectorConfig::from_json(r#"{ "time_scale": 0.5 }"#).unwrap();
        assert_eq!(cfg.time_scale, 0.5);
        assert!(!cfg.auto_finalize);
    }

    #[test]
    fn test_director_rejects_negative_scale() {
        let err = DirectorConfig::from_json(r#"{ "time_scale": -2.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeScale { .. }));
    }

    #[test]
    fn test_time_scale_rejects_non_finite() {
        assert!(validate_time_scale(f64::INFINITY).is_err());
        assert!(validate_time_scale(f64::NAN).is_err());
        assert!(validate_time_scale(0.0).is_ok());
    }

    #[test]
    fn test_sequence_flags_default_off() {
        let cfg = SequenceConfig::from_json("{}").unwrap();
        assert_eq!(cfg, SequenceConfig::default());
    }

    #[test]
    fn test_sequence_builder() {
        let cfg = SequenceConfig::default()
            .with_execute_on_start(true)
            .with_destroy_on_complete(true);
        assert!(cfg.execute_on_start);
        assert!(cfg.destroy_on_complete);
        assert!(!cfg.loop_on_complete);
    }

    #[test]
    fn test_sequence_rejects_bad_json() {
        let err = SequenceConfig::from_json("[1, 2]").unwrap_err();
        assert_eq!(err.as_label(), "config_invalid_json");
    }
}
