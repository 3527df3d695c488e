//! Unified error types for the AHRS link.
//!
//! A single `Error` enum that every step of the session can convert into,
//! keeping the outer resync loop's error handling uniform.  All variants
//! are `Copy` so they can be recorded in the session context and emitted
//! through the event sink without allocation.

use core::fmt;

use crate::proto::messages::MessageKind;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the link funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The transport could not re-establish message alignment.
    Resync(LinkError),
    /// The identity query that follows a resync failed.
    Identity(LinkError),
    /// A counted exchange failed while streaming.
    Exchange {
        category: CommsCategory,
        cause: LinkError,
    },
    /// Configuration is invalid.
    Config(&'static str),
}

impl Error {
    /// Counted category of this failure, if it belongs to one.
    pub fn category(&self) -> Option<CommsCategory> {
        match self {
            Self::Exchange { category, .. } => Some(*category),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resync(e) => write!(f, "resync: {e}"),
            Self::Identity(e) => write!(f, "identity: {e}"),
            Self::Exchange { category, cause } => write!(f, "{category}: {cause}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Failures reported by an [`AhrsLink`](crate::app::ports::AhrsLink).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The resync handshake did not complete.
    ResyncFailed,
    /// The underlying bus reported an error.
    Transfer,
    /// No response frame arrived within the poll budget.
    Timeout,
    /// A frame arrived with a bad length or checksum.
    Framing,
    /// The payload could not be decoded into a response.
    Decode,
    /// The request did not fit into a frame.
    Encode,
    /// The peer answered with a different message kind.
    UnexpectedResponse {
        expected: MessageKind,
        got: MessageKind,
    },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResyncFailed => write!(f, "resync failed"),
            Self::Transfer => write!(f, "bus transfer failed"),
            Self::Timeout => write!(f, "response timeout"),
            Self::Framing => write!(f, "bad frame"),
            Self::Decode => write!(f, "payload decode failed"),
            Self::Encode => write!(f, "payload encode failed"),
            Self::UnexpectedResponse { expected, got } => {
                write!(f, "expected {expected:?} response, got {got:?}")
            }
        }
    }
}

impl std::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// Counted categories
// ---------------------------------------------------------------------------

/// The five exchange categories that carry their own error counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommsCategory {
    Update = 0,
    AttitudeRaw = 1,
    HomeLocation = 2,
    Calibration = 3,
    Algorithm = 4,
}

impl CommsCategory {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Update,
        Self::AttitudeRaw,
        Self::HomeLocation,
        Self::Calibration,
        Self::Algorithm,
    ];

    /// Index into counter arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CommsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::AttitudeRaw => write!(f, "attitude raw"),
            Self::HomeLocation => write!(f, "home location"),
            Self::Calibration => write!(f, "calibration"),
            Self::Algorithm => write!(f, "algorithm"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error counters
// ---------------------------------------------------------------------------

/// Monotonic per-category failure counters.
///
/// Never reset while the process runs; they are the only persistent record
/// of link fault history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCounters {
    counts: [u16; CommsCategory::COUNT],
}

impl ErrorCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one failure.  Saturates instead of wrapping.
    pub fn record(&mut self, category: CommsCategory) {
        let slot = &mut self.counts[category.index()];
        *slot = slot.saturating_add(1);
    }

    pub fn get(&self, category: CommsCategory) -> u16 {
        self.counts[category.index()]
    }

    /// Counters in [`CommsCategory`] order, as published in the status record.
    pub fn as_array(&self) -> [u16; CommsCategory::COUNT] {
        self.counts
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| u32::from(c)).sum()
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Resync(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
