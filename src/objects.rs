//! Records exchanged with the flight controller's object store.
//!
//! These mirror the external publish/subscribe schema: the session reads
//! settings, home, calibration and sensor records, and writes fused
//! attitude, raw sensors, position and status back.  Enumerated fields
//! are closed Rust enums rather than raw integers.

use serde::{Deserialize, Serialize};

use crate::error::CommsCategory;
use crate::nav;

/// Length of the coprocessor serial number (BCD digits).
pub const SERIAL_NUMBER_LEN: usize = 25;

/// Identifies a record in the object store (used for subscriptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    AhrsSettings,
    HomeLocation,
    AhrsCalibration,
    AttitudeSettings,
    BaroAltitude,
    GpsPosition,
    AttitudeActual,
    AttitudeRaw,
    PositionActual,
    AhrsStatus,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Attitude estimation algorithm run by the coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FusionAlgorithm {
    /// Full INS/GPS extended Kalman filter.
    #[default]
    InsGps,
    /// Attitude-only complementary filter.
    Simple,
}

/// User-configurable link settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AhrsSettings {
    /// Streaming period (milliseconds).  Zero falls back to the configured default.
    pub update_period_ms: u32,
    /// Poll raw sensor data every period.
    pub update_raw: bool,
    /// Exchange the fused update every period.
    pub update_filtered: bool,
    pub algorithm: FusionAlgorithm,
}

impl Default for AhrsSettings {
    fn default() -> Self {
        Self {
            update_period_ms: 20,
            update_raw: false,
            update_filtered: true,
            algorithm: FusionAlgorithm::InsGps,
        }
    }
}

/// Home reference: magnetic field, ECEF origin and NED rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HomeLocation {
    /// Home has been fixed.
    pub set: bool,
    /// Operating indoors: GPS is ignored.
    pub indoor: bool,
    /// Latitude, degrees * 1e7.
    pub latitude: i32,
    /// Longitude, degrees * 1e7.
    pub longitude: i32,
    /// Altitude above the ellipsoid (m).
    pub altitude: f32,
    /// ECEF origin in centimetres.
    pub ecef_cm: [i32; 3],
    /// ECEF to NED rotation at the home position.
    pub rne: [[f32; 3]; 3],
    /// Earth magnetic field vector at home (any scale).
    pub be: [f32; 3],
}

impl HomeLocation {
    /// Build a fixed home record from a geodetic position and field vector.
    pub fn from_lla(latitude_deg: f64, longitude_deg: f64, altitude_m: f32, be: [f32; 3]) -> Self {
        let lla = [latitude_deg, longitude_deg, f64::from(altitude_m)];
        let ecef = nav::lla_to_ecef(lla);
        Self {
            set: true,
            indoor: false,
            latitude: (latitude_deg * 1e7).round() as i32,
            longitude: (longitude_deg * 1e7).round() as i32,
            altitude: altitude_m,
            ecef_cm: ecef.map(|m| (m * 100.0).round() as i32),
            rne: nav::rne_from_lla(lla),
            be,
        }
    }

    /// ECEF origin in metres.
    pub fn ecef_m(&self) -> [f64; 3] {
        self.ecef_cm.map(|cm| f64::from(cm) / 100.0)
    }
}

/// How the coprocessor should treat the sensor variances it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalibrationMode {
    /// Use the variances sent by the flight controller.
    #[default]
    Set,
    /// Measure variances once and report them back.
    Measure,
    /// Continuously re-measure and echo variances on every exchange.
    /// Never latches as synced.
    Echo,
}

/// Sensor calibration record: bias, scale and variance per sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AhrsCalibration {
    pub measure_var: CalibrationMode,
    pub accel_bias: [f32; 3],
    pub accel_scale: [f32; 3],
    pub accel_var: [f32; 3],
    pub gyro_bias: [f32; 3],
    pub gyro_scale: [f32; 3],
    pub gyro_var: [f32; 3],
    pub mag_bias: [f32; 3],
    pub mag_scale: [f32; 3],
    pub mag_var: [f32; 3],
}

impl Default for AhrsCalibration {
    fn default() -> Self {
        Self {
            measure_var: CalibrationMode::Set,
            accel_bias: [0.0; 3],
            accel_scale: [1.0; 3],
            accel_var: [5e-4; 3],
            gyro_bias: [0.0; 3],
            gyro_scale: [1.0; 3],
            gyro_var: [1e-5; 3],
            mag_bias: [0.0; 3],
            mag_scale: [1.0; 3],
            mag_var: [5e-5; 3],
        }
    }
}

/// Level trim applied to the fused attitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttitudeSettings {
    /// Degrees subtracted from the reported roll.
    pub roll_bias: f32,
    /// Degrees subtracted from the reported pitch.
    pub pitch_bias: f32,
}

/// Barometric altitude sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaroAltitude {
    /// Metres.
    pub altitude: f32,
    pub temperature: f32,
    pub pressure: f32,
}

/// GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GpsPosition {
    /// Degrees * 1e7.
    pub latitude: i32,
    /// Degrees * 1e7.
    pub longitude: i32,
    /// Height above mean sea level (m).
    pub altitude: f32,
    /// Geoid height above the ellipsoid (m).
    pub geoid_separation: f32,
    /// m/s.
    pub groundspeed: f32,
    /// Degrees from north.
    pub heading: f32,
    pub satellites: u8,
    pub pdop: f32,
    pub hdop: f32,
    pub vdop: f32,
}

impl GpsPosition {
    /// Latitude, longitude (degrees) and ellipsoid height (m).
    pub fn lla(&self) -> [f64; 3] {
        [
            f64::from(self.latitude) / 1e7,
            f64::from(self.longitude) / 1e7,
            f64::from(self.altitude + self.geoid_separation),
        ]
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Fused attitude published after every update exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttitudeActual {
    /// `[w, x, y, z]`.
    pub q: [f32; 4],
    pub roll: f32,
    pub pitch: f32,
    /// Degrees in `[0, 360)`.
    pub yaw: f32,
}

impl Default for AttitudeActual {
    fn default() -> Self {
        Self {
            q: [1.0, 0.0, 0.0, 0.0],
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

/// Raw and filtered sensor readings from the coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttitudeRaw {
    pub magnetometers: [i16; 3],
    pub gyros: [u16; 3],
    pub gyros_filtered: [f32; 3],
    /// XY and Z gyro die temperatures.
    pub gyrotemp: [u16; 2],
    pub accels: [u16; 3],
    pub accels_filtered: [f32; 3],
}

/// Fused position and velocity in the home NED frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionActual {
    pub ned: [f32; 3],
    pub vel: [f32; 3],
}

/// Link status as seen by the rest of the flight controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AhrsStatus {
    pub serial_number: [u8; SERIAL_NUMBER_LEN],
    /// Indexed by [`CommsCategory`].
    pub comm_errors: [u16; CommsCategory::COUNT],
    pub home_set: bool,
    pub calibration_set: bool,
    pub algorithm_set: bool,
    /// Coprocessor CPU load (%).
    pub cpu_load: u8,
    pub idle_time_per_cycle: u32,
    pub running_time_per_cycle: u32,
    pub dropped_updates: u32,
}

impl Default for AhrsStatus {
    fn default() -> Self {
        Self {
            serial_number: [0; SERIAL_NUMBER_LEN],
            comm_errors: [0; CommsCategory::COUNT],
            home_set: false,
            calibration_set: false,
            algorithm_set: false,
            cpu_load: 0,
            idle_time_per_cycle: 0,
            running_time_per_cycle: 0,
            dropped_updates: 0,
        }
    }
}

impl AhrsStatus {
    pub fn comm_errors_for(&self, category: CommsCategory) -> u16 {
        self.comm_errors[category.index()]
    }
}

/// Severity of the link alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlarmSeverity {
    #[default]
    Cleared,
    Critical,
}
