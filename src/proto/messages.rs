//! Request/response messages exchanged with the coprocessor.
//!
//! Seven kinds, each a strict request → response pair.  The link is
//! half-duplex: exactly one request is outstanding at a time.
//!
//! | Kind                | Request payload        | Response payload          |
//! |---------------------|------------------------|---------------------------|
//! | `ResyncProbe`       | -                      | -                         |
//! | `Identity`          | -                      | serial number             |
//! | `SetMagNorth`       | unit field vector      | ack                       |
//! | `SetGetCalibration` | mode + calibration     | mode + measured variances |
//! | `SetAlgorithm`      | fusion algorithm       | ack                       |
//! | `GetAttitudeRaw`    | -                      | raw + filtered sensors    |
//! | `SetGetUpdate`      | optional baro + GPS    | attitude, NED, CPU stats  |

use serde::{Deserialize, Serialize};

use crate::objects::{CalibrationMode, FusionAlgorithm, SERIAL_NUMBER_LEN};

/// Message kind shared by a request and its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    ResyncProbe,
    Identity,
    SetMagNorth,
    SetGetCalibration,
    SetAlgorithm,
    GetAttitudeRaw,
    SetGetUpdate,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagNorthRequest {
    /// Unit-length earth field direction.
    pub be: [f32; 3],
}

/// Calibration push.  Magnetometer scale stays on the flight controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRequest {
    pub measure_var: CalibrationMode,
    pub accel_bias: [f32; 3],
    pub accel_scale: [f32; 3],
    pub accel_var: [f32; 3],
    pub gyro_bias: [f32; 3],
    pub gyro_scale: [f32; 3],
    pub gyro_var: [f32; 3],
    pub mag_bias: [f32; 3],
    pub mag_var: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResponse {
    pub measure_var: CalibrationMode,
    pub accel_var: [f32; 3],
    pub gyro_var: [f32; 3],
    pub mag_var: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmRequest {
    pub algorithm: FusionAlgorithm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub serial_bcd: [u8; SERIAL_NUMBER_LEN],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vec3I16 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vec3U16 {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3F32 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3F32 {
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Raw gyro counts plus die temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GyroRaw {
    pub x: u16,
    pub y: u16,
    pub z: u16,
    pub xy_temp: u16,
    pub z_temp: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttitudeRawResponse {
    pub mags: Vec3I16,
    pub gyros: GyroRaw,
    pub gyros_filtered: Vec3F32,
    pub accels: Vec3U16,
    pub accels_filtered: Vec3F32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaroSample {
    /// Metres.
    pub altitude: f32,
}

/// How much the coprocessor should trust a GPS sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpsQuality {
    /// No usable home or operating indoors: treat as very high variance.
    Indoor,
    /// Fix not yet trusted; displacement is zero.
    Ramping,
    /// Stable fix; displacement is real.
    Good,
}

impl GpsQuality {
    /// Legacy integer tag used by ground tooling.
    pub const fn wire_value(self) -> i8 {
        match self {
            Self::Indoor => -1,
            Self::Ramping => 0,
            Self::Good => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    /// Offset from home (m).
    pub ned: [f32; 3],
    pub groundspeed: f32,
    pub heading: f32,
    pub quality: GpsQuality,
}

impl GpsSample {
    /// Zero displacement and velocity with the given tag.
    pub const fn zero(quality: GpsQuality) -> Self {
        Self {
            ned: [0.0; 3],
            groundspeed: 0.0,
            heading: 0.0,
            quality,
        }
    }
}

/// Combined periodic update.  Absent samples were not refreshed since the
/// last successful exchange.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub barometer: Option<BaroSample>,
    pub gps: Option<GpsSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// `[w, x, y, z]`.
    pub quaternion: [f32; 4],
    pub ned: [f32; 3],
    pub vel: [f32; 3],
    pub load: u8,
    pub idle_time: u32,
    pub run_time: u32,
    pub dropped_updates: u32,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Request {
    ResyncProbe,
    Identity,
    SetMagNorth(MagNorthRequest),
    SetGetCalibration(CalibrationRequest),
    SetAlgorithm(AlgorithmRequest),
    GetAttitudeRaw,
    SetGetUpdate(UpdateRequest),
}

impl Request {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::ResyncProbe => MessageKind::ResyncProbe,
            Self::Identity => MessageKind::Identity,
            Self::SetMagNorth(_) => MessageKind::SetMagNorth,
            Self::SetGetCalibration(_) => MessageKind::SetGetCalibration,
            Self::SetAlgorithm(_) => MessageKind::SetAlgorithm,
            Self::GetAttitudeRaw => MessageKind::GetAttitudeRaw,
            Self::SetGetUpdate(_) => MessageKind::SetGetUpdate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Response {
    ResyncProbe,
    Identity(IdentityResponse),
    SetMagNorth,
    SetGetCalibration(CalibrationResponse),
    SetAlgorithm,
    GetAttitudeRaw(AttitudeRawResponse),
    SetGetUpdate(UpdateResponse),
}

impl Response {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::ResyncProbe => MessageKind::ResyncProbe,
            Self::Identity(_) => MessageKind::Identity,
            Self::SetMagNorth => MessageKind::SetMagNorth,
            Self::SetGetCalibration(_) => MessageKind::SetGetCalibration,
            Self::SetAlgorithm => MessageKind::SetAlgorithm,
            Self::GetAttitudeRaw(_) => MessageKind::GetAttitudeRaw,
            Self::SetGetUpdate(_) => MessageKind::SetGetUpdate,
        }
    }
}
