//! Application service: the hexagonal core.
//!
//! [`AhrsCommsService`] owns the session FSM and its context.  All I/O
//! flows through the port bundle passed into each call, so the whole
//! session runs against mock adapters on the host.
//!
//! ```text
//!   AhrsLink ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!                │     AhrsCommsService       │
//! ObjectStore ◀─▶│  FSM · tracker · GPS gate  │
//!                └───────────────────────────┘
//!                            ▲
//!                          Clock
//! ```

use std::sync::Arc;

use log::info;

use crate::config::CommsConfig;
use crate::error::{CommsCategory, Error, ErrorCounters, Result};
use crate::fsm::context::{SessionContext, SyncState};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::proto::messages::GpsQuality;
use crate::tracker::ConfigSyncTracker;

use super::events::AppEvent;
use super::ports::{EventSink, SessionPorts};

/// The comms session service.
pub struct AhrsCommsService<P> {
    fsm: Fsm<P>,
    ctx: SessionContext,
}

impl<P: SessionPorts> AhrsCommsService<P> {
    /// Construct the service.  Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(config: CommsConfig, tracker: Arc<ConfigSyncTracker>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fsm: Fsm::new(build_state_table(), StateId::Resyncing),
            ctx: SessionContext::new(config, tracker),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial state (RESYNCING, alarm raised).
    pub fn start(&mut self, io: &mut P, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx, io);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        self.flush_events(sink);
        info!("AhrsCommsService started in {:?}", self.fsm.current_state());
    }

    /// Run one FSM step: a resync attempt, an identity query, or a full
    /// streaming period including its sleep.
    pub fn tick(&mut self, io: &mut P, sink: &mut impl EventSink) {
        let prev_state = self.fsm.current_state();

        self.fsm.tick(&mut self.ctx, io);

        self.flush_events(sink);
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    /// Run the session for the rest of the process lifetime.  `on_tick`
    /// runs after every step (the binary feeds the watchdog there).
    pub fn run(&mut self, io: &mut P, sink: &mut impl EventSink, mut on_tick: impl FnMut()) -> ! {
        self.start(io, sink);
        loop {
            self.tick(io, sink);
            on_tick();
        }
    }

    fn flush_events(&mut self, sink: &mut impl EventSink) {
        for event in self.ctx.drain_events() {
            sink.emit(&event);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn synced(&self) -> SyncState {
        self.ctx.synced
    }

    pub fn counters(&self) -> &ErrorCounters {
        &self.ctx.counters
    }

    pub fn error_count(&self, category: CommsCategory) -> u16 {
        self.ctx.error_count(category)
    }

    pub fn good_gps_fixes(&self) -> u32 {
        self.ctx.gps.good_fixes()
    }

    pub fn gps_quality(&self) -> GpsQuality {
        self.ctx.gps.last_quality()
    }

    /// Failure that last sent the session back to RESYNCING.  Cleared when
    /// streaming starts again.
    pub fn last_error(&self) -> Option<Error> {
        self.ctx.last_error
    }

    pub fn tracker(&self) -> &Arc<ConfigSyncTracker> {
        &self.ctx.tracker
    }
}
