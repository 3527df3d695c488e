//! Conversions between object-store records and wire messages.
//!
//! Pure functions; the session decides when to call them.

use crate::error::ErrorCounters;
use crate::nav;
use crate::objects::{
    AhrsCalibration, AhrsSettings, AhrsStatus, AttitudeActual, AttitudeRaw, AttitudeSettings,
    BaroAltitude, HomeLocation, PositionActual,
};

use super::messages::{
    AlgorithmRequest, AttitudeRawResponse, BaroSample, CalibrationRequest, CalibrationResponse,
    IdentityResponse, MagNorthRequest, UpdateResponse,
};

/// Earth field direction for the coprocessor, normalised.
pub fn north_request(home: &HomeLocation) -> MagNorthRequest {
    MagNorthRequest {
        be: nav::unit_or_default(home.be),
    }
}

pub fn calibration_request(cal: &AhrsCalibration) -> CalibrationRequest {
    CalibrationRequest {
        measure_var: cal.measure_var,
        accel_bias: cal.accel_bias,
        accel_scale: cal.accel_scale,
        accel_var: cal.accel_var,
        gyro_bias: cal.gyro_bias,
        gyro_scale: cal.gyro_scale,
        gyro_var: cal.gyro_var,
        mag_bias: cal.mag_bias,
        mag_var: cal.mag_var,
    }
}

/// Copy the device-reported variances into `cal`.  Bias and scale are
/// left untouched.
pub fn apply_calibration_echo(cal: &mut AhrsCalibration, rsp: &CalibrationResponse) {
    cal.accel_var = rsp.accel_var;
    cal.gyro_var = rsp.gyro_var;
    cal.mag_var = rsp.mag_var;
}

pub fn algorithm_request(settings: &AhrsSettings) -> AlgorithmRequest {
    AlgorithmRequest {
        algorithm: settings.algorithm,
    }
}

pub fn baro_sample(baro: &BaroAltitude) -> BaroSample {
    BaroSample {
        altitude: baro.altitude,
    }
}

/// Fused attitude with level trim applied and yaw folded into `[0, 360)`.
pub fn attitude_from_update(rsp: &UpdateResponse, trim: &AttitudeSettings) -> AttitudeActual {
    let rpy = nav::quaternion_to_rpy(rsp.quaternion);
    AttitudeActual {
        q: rsp.quaternion,
        roll: rpy.roll - trim.roll_bias,
        pitch: rpy.pitch - trim.pitch_bias,
        yaw: nav::normalize_yaw(rpy.yaw),
    }
}

pub fn position_from_update(rsp: &UpdateResponse) -> PositionActual {
    PositionActual {
        ned: rsp.ned,
        vel: rsp.vel,
    }
}

/// Copy coprocessor CPU statistics into the status record.
pub fn apply_update_status(status: &mut AhrsStatus, rsp: &UpdateResponse) {
    status.cpu_load = rsp.load;
    status.idle_time_per_cycle = rsp.idle_time;
    status.running_time_per_cycle = rsp.run_time;
    status.dropped_updates = rsp.dropped_updates;
}

pub fn attitude_raw_from(rsp: &AttitudeRawResponse) -> AttitudeRaw {
    AttitudeRaw {
        magnetometers: [rsp.mags.x, rsp.mags.y, rsp.mags.z],
        gyros: [rsp.gyros.x, rsp.gyros.y, rsp.gyros.z],
        gyros_filtered: rsp.gyros_filtered.to_array(),
        gyrotemp: [rsp.gyros.xy_temp, rsp.gyros.z_temp],
        accels: [rsp.accels.x, rsp.accels.y, rsp.accels.z],
        accels_filtered: rsp.accels_filtered.to_array(),
    }
}

/// Store the serial number and the current counters.
pub fn apply_identity(status: &mut AhrsStatus, rsp: &IdentityResponse, counters: &ErrorCounters) {
    status.serial_number = rsp.serial_bcd;
    status.comm_errors = counters.as_array();
}
