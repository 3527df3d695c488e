//! Navigation math: attitude conversion and WGS-84 frame transforms.
//!
//! ```text
//!   LLA (deg, deg, m) ──lla_to_ecef──▶ ECEF (m)
//!                                       │  minus home ECEF
//!                                       ▼
//!                          Rne · Δ ──▶ NED (m)
//! ```
//!
//! Geodesy runs in `f64`; only the final NED offset is narrowed to `f32`
//! because ECEF magnitudes (~6.4e6 m) would lose centimetres in single
//! precision.

use core::f64::consts::PI;

/// WGS-84 semi-major axis (m).
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 first eccentricity.
const WGS84_E: f64 = 8.181_919_084_262_2e-2;

const DEG2RAD: f64 = PI / 180.0;
const RAD2DEG_F32: f32 = 180.0 / core::f32::consts::PI;

/// Roll, pitch, yaw in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rpy {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

/// Convert a unit quaternion `[w, x, y, z]` into aerospace (ZYX) Euler
/// angles in degrees.  Yaw comes out in `(-180, 180]`.
pub fn quaternion_to_rpy(q: [f32; 4]) -> Rpy {
    let [q0, q1, q2, q3] = q;
    let q0s = q0 * q0;
    let q1s = q1 * q1;
    let q2s = q2 * q2;
    let q3s = q3 * q3;

    let r13 = 2.0 * (q1 * q3 - q0 * q2);
    let r11 = q0s + q1s - q2s - q3s;
    let r12 = 2.0 * (q1 * q2 + q0 * q3);
    let r23 = 2.0 * (q2 * q3 + q0 * q1);
    let r33 = q0s - q1s - q2s + q3s;

    Rpy {
        roll: r23.atan2(r33) * RAD2DEG_F32,
        // Clamp guards asin against |R13| creeping past 1 on unnormalised input.
        pitch: (-r13).clamp(-1.0, 1.0).asin() * RAD2DEG_F32,
        yaw: r12.atan2(r11) * RAD2DEG_F32,
    }
}

/// Fold a yaw angle into `[0, 360)`: negative values get 360 added.
pub fn normalize_yaw(yaw: f32) -> f32 {
    let wrapped = if yaw < 0.0 { yaw + 360.0 } else { yaw };
    // -1e-6 + 360.0 rounds to 360.0 in f32.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Scale `v` to unit length.  The zero vector, and anything without a
/// finite length, maps to `(1, 0, 0)` so that a never-configured reference
/// cannot inject NaN into the fusion filter.
///
/// The length is taken in f64: squares of any finite f32 neither overflow
/// nor underflow there.
pub fn unit_or_default(v: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = v.map(f64::from);
    let len = (x * x + y * y + z * z).sqrt();
    if !(len.is_finite() && len > 0.0) {
        return [1.0, 0.0, 0.0];
    }
    [(x / len) as f32, (y / len) as f32, (z / len) as f32]
}

/// Geodetic latitude/longitude (degrees) and height (m) to ECEF (m).
pub fn lla_to_ecef(lla: [f64; 3]) -> [f64; 3] {
    let (sin_lat, cos_lat) = (lla[0] * DEG2RAD).sin_cos();
    let (sin_lon, cos_lon) = (lla[1] * DEG2RAD).sin_cos();
    let e2 = WGS84_E * WGS84_E;
    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    [
        (n + lla[2]) * cos_lat * cos_lon,
        (n + lla[2]) * cos_lat * sin_lon,
        ((1.0 - e2) * n + lla[2]) * sin_lat,
    ]
}

/// Rotation matrix taking ECEF deltas into the NED frame at `lla`.
pub fn rne_from_lla(lla: [f64; 3]) -> [[f32; 3]; 3] {
    let (sin_lat, cos_lat) = (lla[0] * DEG2RAD).sin_cos();
    let (sin_lon, cos_lon) = (lla[1] * DEG2RAD).sin_cos();

    [
        [
            (-sin_lat * cos_lon) as f32,
            (-sin_lat * sin_lon) as f32,
            cos_lat as f32,
        ],
        [-sin_lon as f32, cos_lon as f32, 0.0],
        [
            (-cos_lat * cos_lon) as f32,
            (-cos_lat * sin_lon) as f32,
            -sin_lat as f32,
        ],
    ]
}

/// Position `lla` expressed as a NED offset from `base_ecef`, using the
/// home rotation `rne`.
pub fn lla_to_ned(lla: [f64; 3], base_ecef: [f64; 3], rne: &[[f32; 3]; 3]) -> [f32; 3] {
    let ecef = lla_to_ecef(lla);
    let diff = [
        ecef[0] - base_ecef[0],
        ecef[1] - base_ecef[1],
        ecef[2] - base_ecef[2],
    ];

    let mut ned = [0.0f32; 3];
    for (row, out) in rne.iter().zip(ned.iter_mut()) {
        *out = (f64::from(row[0]) * diff[0]
            + f64::from(row[1]) * diff[1]
            + f64::from(row[2]) * diff[2]) as f32;
    }
    ned
}
