//! Composite adapter: one value that satisfies every session port.
//!
//! Owns the link, the object store and the clock, and forwards each port
//! trait to the matching part.  The service takes a single `&mut` to it,
//! which avoids juggling three simultaneous mutable borrows.

use crate::app::ports::{AhrsLink, Clock, ObjectStore, UpdateCallback};
use crate::error::LinkError;
use crate::objects::{
    AhrsCalibration, AhrsSettings, AhrsStatus, AlarmSeverity, AttitudeActual, AttitudeRaw,
    AttitudeSettings, BaroAltitude, GpsPosition, HomeLocation, ObjectId, PositionActual,
};
use crate::proto::{Request, Response};

#[derive(Default)]
pub struct Board<L, S, C> {
    pub link: L,
    pub store: S,
    pub clock: C,
}

impl<L, S, C> Board<L, S, C> {
    pub fn new(link: L, store: S, clock: C) -> Self {
        Self { link, store, clock }
    }
}

// ── AhrsLink ──────────────────────────────────────────────────

impl<L: AhrsLink, S, C> AhrsLink for Board<L, S, C> {
    fn resync(&mut self) -> Result<(), LinkError> {
        self.link.resync()
    }

    fn exchange(&mut self, request: &Request) -> Result<Response, LinkError> {
        self.link.exchange(request)
    }
}

// ── Clock ─────────────────────────────────────────────────────

impl<L, S, C: Clock> Clock for Board<L, S, C> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn sleep_ms(&self, ms: u32) {
        self.clock.sleep_ms(ms);
    }

    fn sleep_until_ms(&self, deadline_ms: u64) {
        self.clock.sleep_until_ms(deadline_ms);
    }
}

// ── ObjectStore ───────────────────────────────────────────────

impl<L, S: ObjectStore, C> ObjectStore for Board<L, S, C> {
    fn ahrs_settings(&self) -> AhrsSettings {
        self.store.ahrs_settings()
    }

    fn home_location(&self) -> HomeLocation {
        self.store.home_location()
    }

    fn calibration(&self) -> AhrsCalibration {
        self.store.calibration()
    }

    fn attitude_settings(&self) -> AttitudeSettings {
        self.store.attitude_settings()
    }

    fn baro_altitude(&self) -> BaroAltitude {
        self.store.baro_altitude()
    }

    fn gps_position(&self) -> GpsPosition {
        self.store.gps_position()
    }

    fn ahrs_status(&self) -> AhrsStatus {
        self.store.ahrs_status()
    }

    fn set_calibration(&mut self, calibration: AhrsCalibration) {
        self.store.set_calibration(calibration);
    }

    fn set_attitude_actual(&mut self, attitude: AttitudeActual) {
        self.store.set_attitude_actual(attitude);
    }

    fn set_attitude_raw(&mut self, raw: AttitudeRaw) {
        self.store.set_attitude_raw(raw);
    }

    fn set_position_actual(&mut self, position: PositionActual) {
        self.store.set_position_actual(position);
    }

    fn set_ahrs_status(&mut self, status: AhrsStatus) {
        self.store.set_ahrs_status(status);
    }

    fn set_alarm(&mut self, severity: AlarmSeverity) {
        self.store.set_alarm(severity);
    }

    fn subscribe(&mut self, object: ObjectId, callback: UpdateCallback) {
        self.store.subscribe(object, callback);
    }
}
