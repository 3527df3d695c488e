//! Port traits: the hexagonal boundary between the session logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AhrsCommsService (domain)
//! ```
//!
//! The SPI link, the object store and the clock are driven adapters that
//! implement these traits.  The [`AhrsCommsService`](super::service::AhrsCommsService)
//! consumes them via generics, so the session never touches a peripheral
//! directly and runs unchanged against mocks on the host.

use crate::error::LinkError;
use crate::objects::{
    AhrsCalibration, AhrsSettings, AhrsStatus, AlarmSeverity, AttitudeActual, AttitudeRaw,
    AttitudeSettings, BaroAltitude, GpsPosition, HomeLocation, ObjectId, PositionActual,
};
use crate::proto::{Request, Response};

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain ↔ coprocessor)
// ───────────────────────────────────────────────────────────────

/// Half-duplex request/response transport to the coprocessor.
pub trait AhrsLink {
    /// Re-establish message alignment with the peer.
    fn resync(&mut self) -> Result<(), LinkError>;

    /// Send one request and wait for the matching response.  Blocking.
    fn exchange(&mut self, request: &Request) -> Result<Response, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Object store port (driven adapter: domain ↔ flight data bus)
// ───────────────────────────────────────────────────────────────

/// Change-notification callback registered with the store.
///
/// Runs on whatever context performed the write, so it must only touch
/// thread-safe state.
pub type UpdateCallback = Box<dyn FnMut() + Send>;

/// Typed access to the flight controller's shared records.
///
/// Every setter must invoke the callbacks subscribed to that record.
pub trait ObjectStore {
    fn ahrs_settings(&self) -> AhrsSettings;
    fn home_location(&self) -> HomeLocation;
    fn calibration(&self) -> AhrsCalibration;
    fn attitude_settings(&self) -> AttitudeSettings;
    fn baro_altitude(&self) -> BaroAltitude;
    fn gps_position(&self) -> GpsPosition;
    fn ahrs_status(&self) -> AhrsStatus;

    fn set_calibration(&mut self, calibration: AhrsCalibration);
    fn set_attitude_actual(&mut self, attitude: AttitudeActual);
    fn set_attitude_raw(&mut self, raw: AttitudeRaw);
    fn set_position_actual(&mut self, position: PositionActual);
    fn set_ahrs_status(&mut self, status: AhrsStatus);

    /// Raise or clear the link alarm.
    fn set_alarm(&mut self, severity: AlarmSeverity);

    /// Register `callback` to run after every update of `object`.
    fn subscribe(&mut self, object: ObjectId, callback: UpdateCallback);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ↔ RTOS tick)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond time source with blocking sleeps.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    fn sleep_ms(&self, ms: u32);

    /// Block until `deadline_ms`.  Returns immediately if it already passed.
    fn sleep_until_ms(&self, deadline_ms: u64) {
        let now = self.now_ms();
        if deadline_ms > now {
            self.sleep_ms((deadline_ms - now).min(u64::from(u32::MAX)) as u32);
        }
    }
}

/// Everything a session tick needs, implemented by one composite adapter.
pub trait SessionPorts: AhrsLink + ObjectStore + Clock {}

impl<T: AhrsLink + ObjectStore + Clock> SessionPorts for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The session emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
