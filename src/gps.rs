//! GPS fusion preprocessor.
//!
//! Decides how a GPS fix is folded into the combined update request.  A
//! sample is always produced so the coprocessor's fusion timing stays
//! regular; its quality tag tells the filter how far to trust it.
//!
//! ```text
//!   home unset / indoor ───────────────────────────▶ Indoor  (zeros)
//!   gate fails ──▶ counter = 0 ────────────────────▶ Ramping (zeros)
//!   gate passes ─▶ counter += 1 ─┬─ counter <  N ──▶ Ramping (zeros)
//!                                └─ counter >= N ──▶ Good    (NED)
//! ```
//!
//! The hysteresis costs `N` samples of latency after every lock or glitch
//! and keeps marginal fixes right after acquisition out of the filter.

use crate::config::CommsConfig;
use crate::nav;
use crate::objects::{GpsPosition, HomeLocation};
use crate::proto::messages::{GpsQuality, GpsSample};

/// Consecutive-good-fix counter with the last emitted quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsQualityFilter {
    good_fixes: u32,
    threshold: u32,
    min_satellites: u8,
    max_hdop: f32,
    last_quality: GpsQuality,
}

impl GpsQualityFilter {
    pub fn new(config: &CommsConfig) -> Self {
        Self {
            good_fixes: 0,
            threshold: config.gps_good_fix_threshold,
            min_satellites: config.gps_min_satellites,
            max_hdop: config.gps_max_hdop,
            last_quality: GpsQuality::Ramping,
        }
    }

    /// Forget all accumulated fixes.  Called on every resync.
    pub fn reset(&mut self) {
        self.good_fixes = 0;
        self.last_quality = GpsQuality::Ramping;
    }

    pub fn good_fixes(&self) -> u32 {
        self.good_fixes
    }

    pub fn last_quality(&self) -> GpsQuality {
        self.last_quality
    }

    /// Build the GPS sub-message for one update exchange.
    pub fn process(&mut self, fix: &GpsPosition, home: &HomeLocation) -> GpsSample {
        let sample = if !home.set || home.indoor {
            GpsSample::zero(GpsQuality::Indoor)
        } else if fix.satellites >= self.min_satellites && fix.hdop < self.max_hdop {
            // Saturate at the threshold; the count carries no meaning past it.
            self.good_fixes = (self.good_fixes + 1).min(self.threshold);
            if self.good_fixes < self.threshold {
                GpsSample::zero(GpsQuality::Ramping)
            } else {
                GpsSample {
                    ned: nav::lla_to_ned(fix.lla(), home.ecef_m(), &home.rne),
                    groundspeed: fix.groundspeed,
                    heading: fix.heading,
                    quality: GpsQuality::Good,
                }
            }
        } else {
            self.good_fixes = 0;
            GpsSample::zero(GpsQuality::Ramping)
        };

        self.last_quality = sample.quality;
        sample
    }
}
