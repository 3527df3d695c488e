//! Session state threaded through every FSM handler.
//!
//! `SessionContext` is the single struct that state handlers read from and
//! write to.  It holds the per-domain sync booleans, the GPS quality
//! filter, the error counters, the period anchor and the status record the
//! session publishes.  Only the session task touches it; the one piece of
//! shared state is the [`ConfigSyncTracker`] behind an `Arc`.

use std::sync::Arc;

use heapless::Vec;
use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::ObjectStore;
use crate::config::CommsConfig;
use crate::error::{CommsCategory, Error, ErrorCounters};
use crate::gps::GpsQualityFilter;
use crate::objects::{AhrsSettings, AhrsStatus};
use crate::tracker::ConfigSyncTracker;

/// Events buffered between two service ticks.
pub const EVENT_QUEUE_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Per-domain sync state
// ---------------------------------------------------------------------------

/// Whether each configuration domain has been accepted by the coprocessor
/// during the current session.  All false after every resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncState {
    pub home: bool,
    pub calibration: bool,
    pub algorithm: bool,
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct SessionContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    /// Absolute wake time of the current streaming period (ms).
    pub period_anchor_ms: u64,

    // -- Configuration --
    pub config: CommsConfig,
    /// Settings snapshot refreshed at the top of every period.
    pub settings: AhrsSettings,

    // -- Session --
    pub synced: SyncState,
    pub gps: GpsQualityFilter,
    pub counters: ErrorCounters,
    /// Last status record published to the store.
    pub status: AhrsStatus,
    /// Failure that ended the last streaming period, if any.
    pub last_error: Option<Error>,

    // -- Shared --
    pub tracker: Arc<ConfigSyncTracker>,

    // -- Outbound --
    events: Vec<AppEvent, EVENT_QUEUE_LEN>,
}

impl SessionContext {
    pub fn new(config: CommsConfig, tracker: Arc<ConfigSyncTracker>) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            period_anchor_ms: 0,
            gps: GpsQualityFilter::new(&config),
            config,
            settings: AhrsSettings::default(),
            synced: SyncState::default(),
            counters: ErrorCounters::new(),
            status: AhrsStatus::default(),
            last_error: None,
            tracker,
            events: Vec::new(),
        }
    }

    /// Forget everything the coprocessor was told.  Run before every
    /// resync attempt.
    pub fn reset_session(&mut self) {
        self.synced = SyncState::default();
        self.gps.reset();
    }

    /// Count a failed exchange and remember it.
    pub fn record_failure(&mut self, err: Error) {
        if let Some(category) = err.category() {
            self.counters.record(category);
        }
        self.last_error = Some(err);
        self.push_event(AppEvent::LinkFault(err));
    }

    pub fn error_count(&self, category: CommsCategory) -> u16 {
        self.counters.get(category)
    }

    /// Copy sync flags and counters into the status record and publish it
    /// if anything changed.
    pub fn publish_status(&mut self, store: &mut impl ObjectStore) {
        let mut next = self.status;
        next.home_set = self.synced.home;
        next.calibration_set = self.synced.calibration;
        next.algorithm_set = self.synced.algorithm;
        next.comm_errors = self.counters.as_array();
        if next != self.status {
            self.status = next;
            store.set_ahrs_status(next);
        }
    }

    /// Publish the status record unconditionally.
    pub fn force_publish_status(&mut self, store: &mut impl ObjectStore) {
        self.status.home_set = self.synced.home;
        self.status.calibration_set = self.synced.calibration;
        self.status.algorithm_set = self.synced.algorithm;
        self.status.comm_errors = self.counters.as_array();
        store.set_ahrs_status(self.status);
    }
    /// Queue an event for the service to forward to its sink.
    pub fn push_event(&mut self, event: AppEvent) {
        if self.events.push(event).is_err() {
            warn!("Event queue full, dropping event");
        }
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = AppEvent> + '_ {
        let drained = core::mem::take(&mut self.events);
        drained.into_iter()
    }
}
