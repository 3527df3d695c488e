//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing session events to the `log` facade
//! (the ESP-IDF logger on target, UART / USB-CDC).  A telemetry adapter
//! would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Identified { serial } => {
                info!("IDENT | serial={:02x?}", serial);
            }
            AppEvent::ConfigPushed(flag) => {
                info!("CONFIG | pushed {:?}", flag);
            }
            AppEvent::GpsQualityChanged { from, to } => {
                info!(
                    "GPS | quality {:?} ({}) -> {:?} ({})",
                    from,
                    from.wire_value(),
                    to,
                    to.wire_value()
                );
            }
            AppEvent::LinkFault(err) => {
                warn!("FAULT | {}", err);
            }
        }
    }
}
