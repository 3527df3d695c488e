//! Outbound application events.
//!
//! The [`AhrsCommsService`](super::service::AhrsCommsService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::error::Error;
use crate::fsm::StateId;
use crate::proto::messages::GpsQuality;
use crate::tracker::DirtyFlag;

/// Structured events emitted by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(StateId),

    /// The session moved between states.
    StateChanged { from: StateId, to: StateId },

    /// The coprocessor identified itself after a resync.
    Identified { serial: [u8; crate::objects::SERIAL_NUMBER_LEN] },

    /// A configuration domain was pushed and acknowledged.
    ConfigPushed(DirtyFlag),

    /// The GPS sample quality tag changed.
    GpsQualityChanged { from: GpsQuality, to: GpsQuality },

    /// An exchange failed; the session will resync.
    LinkFault(Error),
}
