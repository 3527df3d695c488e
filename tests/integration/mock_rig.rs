//! Mock adapters for integration tests.
//!
//! `FakeCoprocessor` answers every request with the matching response
//! kind and records what it was sent.  Failures are injected per message
//! kind.  `FakeClock` shares its time cell with the coprocessor so that
//! exchanges can take simulated time.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use ahrscomms::adapters::board::Board;
use ahrscomms::adapters::memory_store::MemoryObjectStore;
use ahrscomms::app::events::AppEvent;
use ahrscomms::app::ports::{AhrsLink, Clock, EventSink};
use ahrscomms::app::service::AhrsCommsService;
use ahrscomms::config::CommsConfig;
use ahrscomms::error::LinkError;
use ahrscomms::fsm::StateId;
use ahrscomms::objects::SERIAL_NUMBER_LEN;
use ahrscomms::proto::messages::{
    AttitudeRawResponse, CalibrationResponse, GyroRaw, IdentityResponse, UpdateRequest,
    UpdateResponse, Vec3F32, Vec3I16, Vec3U16,
};
use ahrscomms::proto::{MessageKind, Request, Response};
use ahrscomms::tracker::ConfigSyncTracker;

pub const SERIAL: [u8; SERIAL_NUMBER_LEN] = [0x42; SERIAL_NUMBER_LEN];

// ── FakeCoprocessor ───────────────────────────────────────────

pub struct FakeCoprocessor {
    pub resync_ok: bool,
    pub resync_attempts: u32,
    pub sent: Vec<Request>,
    /// Each entry fails the next request of that kind once.
    pub fail_on: Vec<MessageKind>,
    /// Attitude reported in every update response.
    pub quaternion: [f32; 4],
    /// Variances echoed back for every calibration push.
    pub measured_var: [f32; 3],
    /// Simulated time each exchange takes.
    pub latency_ms: u64,
    now: Rc<Cell<u64>>,
}

#[allow(dead_code)]
impl FakeCoprocessor {
    pub fn sent_kinds(&self) -> Vec<MessageKind> {
        self.sent.iter().map(Request::kind).collect()
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.sent.iter().filter(|r| r.kind() == kind).count()
    }

    pub fn update_requests(&self) -> Vec<UpdateRequest> {
        self.sent
            .iter()
            .filter_map(|r| match r {
                Request::SetGetUpdate(u) => Some(*u),
                _ => None,
            })
            .collect()
    }

    fn respond(&self, request: &Request) -> Response {
        match request {
            Request::ResyncProbe => Response::ResyncProbe,
            Request::Identity => Response::Identity(IdentityResponse { serial_bcd: SERIAL }),
            Request::SetMagNorth(_) => Response::SetMagNorth,
            Request::SetGetCalibration(cal) => Response::SetGetCalibration(CalibrationResponse {
                measure_var: cal.measure_var,
                accel_var: self.measured_var,
                gyro_var: self.measured_var,
                mag_var: self.measured_var,
            }),
            Request::SetAlgorithm(_) => Response::SetAlgorithm,
            Request::GetAttitudeRaw => Response::GetAttitudeRaw(AttitudeRawResponse {
                mags: Vec3I16 { x: 100, y: -50, z: 400 },
                gyros: GyroRaw {
                    x: 1650,
                    y: 1651,
                    z: 1652,
                    xy_temp: 2100,
                    z_temp: 2101,
                },
                gyros_filtered: Vec3F32 { x: 0.1, y: 0.2, z: 0.3 },
                accels: Vec3U16 { x: 2048, y: 2049, z: 2900 },
                accels_filtered: Vec3F32 { x: 0.0, y: 0.0, z: -9.81 },
            }),
            Request::SetGetUpdate(_) => Response::SetGetUpdate(UpdateResponse {
                quaternion: self.quaternion,
                ned: [1.0, 2.0, -3.0],
                vel: [0.5, 0.0, 0.0],
                load: 37,
                idle_time: 1200,
                run_time: 800,
                dropped_updates: 2,
            }),
        }
    }
}

impl AhrsLink for FakeCoprocessor {
    fn resync(&mut self) -> Result<(), LinkError> {
        self.resync_attempts += 1;
        if self.resync_ok {
            Ok(())
        } else {
            Err(LinkError::ResyncFailed)
        }
    }

    fn exchange(&mut self, request: &Request) -> Result<Response, LinkError> {
        self.now.set(self.now.get() + self.latency_ms);
        self.sent.push(*request);
        if let Some(pos) = self.fail_on.iter().position(|k| *k == request.kind()) {
            self.fail_on.remove(pos);
            return Err(LinkError::Timeout);
        }
        Ok(self.respond(request))
    }
}

// ── FakeClock ─────────────────────────────────────────────────

pub struct FakeClock {
    now: Rc<Cell<u64>>,
    pub sleeps: RefCell<Vec<u32>>,
}

#[allow(dead_code)]
impl FakeClock {
    /// Standalone clock starting at zero.
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u32) {
        self.sleeps.borrow_mut().push(ms);
        self.now.set(self.now.get() + u64::from(ms));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn faults(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::LinkFault(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type Rig = Board<FakeCoprocessor, MemoryObjectStore, FakeClock>;

pub struct Harness {
    pub service: AhrsCommsService<Rig>,
    pub rig: Rig,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Harness {
    /// Started service whose link accepts every resync.
    pub fn new() -> Self {
        let now = Rc::new(Cell::new(0));
        let link = FakeCoprocessor {
            resync_ok: true,
            resync_attempts: 0,
            sent: Vec::new(),
            fail_on: Vec::new(),
            quaternion: [1.0, 0.0, 0.0, 0.0],
            measured_var: [0.01, 0.02, 0.03],
            latency_ms: 0,
            now: Rc::clone(&now),
        };
        let clock = FakeClock {
            now,
            sleeps: RefCell::new(Vec::new()),
        };

        let tracker = Arc::new(ConfigSyncTracker::new());
        let mut store = MemoryObjectStore::new();
        ConfigSyncTracker::connect(&tracker, &mut store);

        let mut rig = Board::new(link, store, clock);
        let mut sink = RecordingSink::default();
        let mut service =
            AhrsCommsService::new(CommsConfig::default(), tracker).expect("default config is valid");
        service.start(&mut rig, &mut sink);

        Self { service, rig, sink }
    }

    pub fn tick(&mut self) {
        self.service.tick(&mut self.rig, &mut self.sink);
    }

    pub fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Tick until the session reaches STREAMING (resync + identity).
    pub fn connect(&mut self) {
        for _ in 0..10 {
            if self.service.state() == StateId::Streaming {
                return;
            }
            self.tick();
        }
        panic!("session never reached Streaming");
    }

    pub fn now(&self) -> u64 {
        self.rig.clock.now()
    }
}
