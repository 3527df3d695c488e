//! Concrete state handler functions and table builder.
//!
//! ```text
//!                 ┌──[resync fails]──┐
//!                 ▼                  │
//!  start ──▶ RESYNCING ─────────────┘
//!                 │ ▲  ▲
//!        [resync ok] │  └──────[any exchange fails]──────┐
//!                 ▼  │                                   │
//!             IDENTITY ──[identity ok]──▶ STREAMING ─────┘
//!                 │                         │   ▲
//!        [identity fails] ─▶ RESYNCING      └───┘ [period ok, sleep]
//! ```
//!
//! The alarm is CRITICAL from the moment RESYNCING is entered until an
//! identity exchange succeeds.

use log::{debug, info, warn};

use super::context::SessionContext;
use super::streaming;
use super::{StateDescriptor, StateId};
use crate::app::events::AppEvent;
use crate::app::ports::SessionPorts;
use crate::error::Error;
use crate::objects::AlarmSeverity;
use crate::proto::marshal;
use crate::proto::{Request, Response};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Called once at startup.
pub fn build_state_table<P: SessionPorts>() -> [StateDescriptor<P>; StateId::COUNT] {
    [
        // Index 0: Resyncing
        StateDescriptor {
            id: StateId::Resyncing,
            name: "Resyncing",
            on_enter: Some(resyncing_enter::<P>),
            on_exit: None,
            on_update: resyncing_update::<P>,
        },
        // Index 1: Identity
        StateDescriptor {
            id: StateId::Identity,
            name: "Identity",
            on_enter: None,
            on_exit: None,
            on_update: identity_update::<P>,
        },
        // Index 2: Streaming
        StateDescriptor {
            id: StateId::Streaming,
            name: "Streaming",
            on_enter: Some(streaming_enter::<P>),
            on_exit: None,
            on_update: streaming_update::<P>,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESYNCING
// ═══════════════════════════════════════════════════════════════════════════

fn resyncing_enter<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) {
    io.set_alarm(AlarmSeverity::Critical);
    ctx.reset_session();
    ctx.publish_status(io);
    info!("RESYNCING: link down, alarm raised");
}

fn resyncing_update<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Option<StateId> {
    // The coprocessor forgets everything across a reconnect.
    ctx.reset_session();

    match io.resync() {
        Ok(()) => Some(StateId::Identity),
        Err(e) => {
            debug!("Resync attempt {} failed: {}", ctx.ticks_in_state, e);
            io.sleep_ms(ctx.config.resync_backoff_ms);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDENTITY
// ═══════════════════════════════════════════════════════════════════════════

fn identity_update<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Option<StateId> {
    let request = Request::Identity;
    let result = match io.exchange(&request) {
        Ok(Response::Identity(rsp)) => Ok(rsp),
        Ok(other) => Err(streaming::mismatch(&request, &other)),
        Err(e) => Err(e),
    };

    match result {
        Ok(rsp) => {
            marshal::apply_identity(&mut ctx.status, &rsp, &ctx.counters);
            ctx.force_publish_status(io);
            io.set_alarm(AlarmSeverity::Cleared);
            info!("IDENTITY: coprocessor serial {:02x?}", rsp.serial_bcd);
            ctx.push_event(AppEvent::Identified {
                serial: rsp.serial_bcd,
            });
            Some(StateId::Streaming)
        }
        Err(cause) => {
            // Outside the five counted categories.
            warn!("IDENTITY: query failed: {}", cause);
            ctx.record_failure(Error::Identity(cause));
            Some(StateId::Resyncing)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  STREAMING
// ═══════════════════════════════════════════════════════════════════════════

fn streaming_enter<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) {
    ctx.period_anchor_ms = io.now_ms();
    ctx.last_error = None;
    info!("STREAMING: link up");
}

fn streaming_update<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Option<StateId> {
    match streaming::run_period(ctx, io) {
        Ok(()) => {
            // Absolute anchor: jitter inside the period never accumulates.
            let period = match ctx.settings.update_period_ms {
                0 => ctx.config.default_update_period_ms,
                ms => ms,
            };
            ctx.period_anchor_ms += u64::from(period);
            io.sleep_until_ms(ctx.period_anchor_ms);
            None
        }
        Err(e) => {
            warn!("STREAMING: {}, resyncing", e);
            ctx.record_failure(e);
            ctx.publish_status(io);
            Some(StateId::Resyncing)
        }
    }
}
