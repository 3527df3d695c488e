//! Link configuration parameters
//!
//! Tunables for the coprocessor session that are fixed at build or boot
//! time.  User-facing runtime settings (poll period, raw/filtered mode,
//! algorithm) live in [`AhrsSettings`](crate::objects::AhrsSettings) and
//! are re-read every streaming period.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Core link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommsConfig {
    // --- Session ---
    /// Delay between consecutive resync attempts (milliseconds)
    pub resync_backoff_ms: u32,
    /// Streaming period used when the settings record carries zero (milliseconds)
    pub default_update_period_ms: u32,

    // --- GPS quality gate ---
    /// Minimum satellites in view for a fix to pass the gate
    pub gps_min_satellites: u8,
    /// Horizontal dilution of precision must be strictly below this
    pub gps_max_hdop: f32,
    /// Consecutive passing fixes before positions are forwarded
    pub gps_good_fix_threshold: u32,

    // --- Link adapter ---
    /// Read polls the SPI link performs before declaring a timeout
    pub max_response_polls: u16,
}

impl Default for CommsConfig {
    fn default() -> Self {
        Self {
            // Session
            resync_backoff_ms: 100,
            default_update_period_ms: 20, // 50 Hz

            // GPS gate
            gps_min_satellites: 7,
            gps_max_hdop: 3.5,
            gps_good_fix_threshold: 30,

            // Link
            max_response_polls: 32,
        }
    }
}

impl CommsConfig {
    /// Reject values that would stall or disable the session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resync_backoff_ms == 0 {
            return Err(ConfigError::ValidationFailed("resync_backoff_ms must be > 0"));
        }
        if self.default_update_period_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "default_update_period_ms must be > 0",
            ));
        }
        if !(self.gps_max_hdop.is_finite() && self.gps_max_hdop > 0.0) {
            return Err(ConfigError::ValidationFailed("gps_max_hdop must be positive"));
        }
        if self.gps_good_fix_threshold == 0 {
            return Err(ConfigError::ValidationFailed(
                "gps_good_fix_threshold must be > 0",
            ));
        }
        if self.max_response_polls == 0 {
            return Err(ConfigError::ValidationFailed("max_response_polls must be > 0"));
        }
        Ok(())
    }
}

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
