//! Error types used by the stagehand runtime.
//!
//! Lifecycle operations (`execute`, `pause`, `resume`, `halt` and the batch
//! variants) never fail: calls made from the wrong state are silent no-ops.
//! The only fallible surface is configuration, covered by [`ConfigError`].
//!
//! Like the rest of the crate's errors, [`ConfigError`] provides helper methods
//! (`as_label`, `as_message`) for logging.

use thiserror::Error;

/// # Errors produced while building or changing configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Time scale must be finite and non-negative.
    #[error("invalid time scale {scale}; expected a finite value >= 0")]
    InvalidTimeScale {
        /// The rejected scale.
        scale: f64,
    },

    /// Configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use stagehand::ConfigError;
    ///
    /// let err = ConfigError::InvalidTimeScale { scale: -1.0 };
    /// assert_eq!(err.as_label(), "config_invalid_time_scale");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidTimeScale { .. } => "config_invalid_time_scale",
            ConfigError::InvalidJson(_) => "config_invalid_json",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::InvalidTimeScale { scale } => format!("time scale rejected: {scale}"),
            ConfigError::InvalidJson(e) => format!("json: {e}"),
        }
    }
}
