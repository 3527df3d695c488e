//! In-memory object store.
//!
//! Holds one copy of every record and calls subscribers synchronously from
//! the setter, the same way the flight controller's object manager fires
//! update callbacks.  Used by the binary until a real data bus is wired
//! in, and by every host test.

use std::collections::HashMap;

use crate::app::ports::{ObjectStore, UpdateCallback};
use crate::objects::{
    AhrsCalibration, AhrsSettings, AhrsStatus, AlarmSeverity, AttitudeActual, AttitudeRaw,
    AttitudeSettings, BaroAltitude, GpsPosition, HomeLocation, ObjectId, PositionActual,
};

#[derive(Default)]
pub struct MemoryObjectStore {
    settings: AhrsSettings,
    home: HomeLocation,
    calibration: AhrsCalibration,
    attitude_settings: AttitudeSettings,
    baro: BaroAltitude,
    gps: GpsPosition,
    attitude: AttitudeActual,
    raw: AttitudeRaw,
    position: PositionActual,
    status: AhrsStatus,
    alarm: AlarmSeverity,
    subscribers: Vec<(ObjectId, UpdateCallback)>,
    updates: HashMap<ObjectId, u32>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&mut self, object: ObjectId) {
        *self.updates.entry(object).or_insert(0) += 1;
        for (id, callback) in &mut self.subscribers {
            if *id == object {
                callback();
            }
        }
    }

    /// Number of times `object` has been written.
    pub fn update_count(&self, object: ObjectId) -> u32 {
        self.updates.get(&object).copied().unwrap_or(0)
    }

    // ── Inputs written by other flight-controller modules ─────

    pub fn set_ahrs_settings(&mut self, settings: AhrsSettings) {
        self.settings = settings;
        self.notify(ObjectId::AhrsSettings);
    }

    pub fn set_home_location(&mut self, home: HomeLocation) {
        self.home = home;
        self.notify(ObjectId::HomeLocation);
    }

    pub fn set_attitude_settings(&mut self, settings: AttitudeSettings) {
        self.attitude_settings = settings;
        self.notify(ObjectId::AttitudeSettings);
    }

    pub fn set_baro_altitude(&mut self, baro: BaroAltitude) {
        self.baro = baro;
        self.notify(ObjectId::BaroAltitude);
    }

    pub fn set_gps_position(&mut self, gps: GpsPosition) {
        self.gps = gps;
        self.notify(ObjectId::GpsPosition);
    }

    // ── Outputs produced by the session ───────────────────────

    pub fn attitude_actual(&self) -> AttitudeActual {
        self.attitude
    }

    pub fn attitude_raw(&self) -> AttitudeRaw {
        self.raw
    }

    pub fn position_actual(&self) -> PositionActual {
        self.position
    }

    pub fn alarm(&self) -> AlarmSeverity {
        self.alarm
    }
}

impl ObjectStore for MemoryObjectStore {
    fn ahrs_settings(&self) -> AhrsSettings {
        self.settings
    }

    fn home_location(&self) -> HomeLocation {
        self.home
    }

    fn calibration(&self) -> AhrsCalibration {
        self.calibration
    }

    fn attitude_settings(&self) -> AttitudeSettings {
        self.attitude_settings
    }

    fn baro_altitude(&self) -> BaroAltitude {
        self.baro
    }

    fn gps_position(&self) -> GpsPosition {
        self.gps
    }

    fn ahrs_status(&self) -> AhrsStatus {
        self.status
    }

    fn set_calibration(&mut self, calibration: AhrsCalibration) {
        self.calibration = calibration;
        self.notify(ObjectId::AhrsCalibration);
    }

    fn set_attitude_actual(&mut self, attitude: AttitudeActual) {
        self.attitude = attitude;
        self.notify(ObjectId::AttitudeActual);
    }

    fn set_attitude_raw(&mut self, raw: AttitudeRaw) {
        self.raw = raw;
        self.notify(ObjectId::AttitudeRaw);
    }

    fn set_position_actual(&mut self, position: PositionActual) {
        self.position = position;
        self.notify(ObjectId::PositionActual);
    }

    fn set_ahrs_status(&mut self, status: AhrsStatus) {
        self.status = status;
        self.notify(ObjectId::AhrsStatus);
    }

    fn set_alarm(&mut self, severity: AlarmSeverity) {
        self.alarm = severity;
    }

    fn subscribe(&mut self, object: ObjectId, callback: UpdateCallback) {
        self.subscribers.push((object, callback));
    }
}
