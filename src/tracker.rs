//! Edge-triggered configuration dirty flags.
//!
//! Object-store subscription callbacks run outside the session task and
//! set a flag per domain.  The session reads the flags once per period and
//! clears a flag only after the coprocessor confirmed the push.
//!
//! ```text
//!  store.set(HomeLocation) ──▶ notify(Home) ──▶ [dirty] ──▶ session push
//!                                                   ▲            │
//!                                                   └── clear ◀──┘ (on ack)
//! ```
//!
//! Any number of edits between two observations collapse into one pending
//! push, so a plain atomic per flag is enough: concurrent writers can only
//! ever store `true`.
//!
//! The calibration domain has one extra one-shot flag.  The session raises
//! it right before writing device-echoed variances back into the store;
//! the next calibration notification consumes it instead of marking the
//! domain dirty.

use core::sync::atomic::{AtomicBool, Ordering};

use std::sync::Arc;

use crate::app::ports::ObjectStore;
use crate::objects::ObjectId;

/// One coalescing flag per tracked record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DirtyFlag {
    HomeLocation = 0,
    Calibration = 1,
    AlgorithmSettings = 2,
    BaroAltitude = 3,
    GpsPosition = 4,
}

impl DirtyFlag {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::HomeLocation,
        Self::Calibration,
        Self::AlgorithmSettings,
        Self::BaroAltitude,
        Self::GpsPosition,
    ];

    /// The object-store record whose updates raise this flag.
    pub const fn source(self) -> ObjectId {
        match self {
            Self::HomeLocation => ObjectId::HomeLocation,
            Self::Calibration => ObjectId::AhrsCalibration,
            Self::AlgorithmSettings => ObjectId::AhrsSettings,
            Self::BaroAltitude => ObjectId::BaroAltitude,
            Self::GpsPosition => ObjectId::GpsPosition,
        }
    }
}

/// Shared dirty-flag record.
///
/// Construct once, wrap in an [`Arc`], hand one clone to the session and
/// register the others with the object store via [`ConfigSyncTracker::connect`].
#[derive(Debug, Default)]
pub struct ConfigSyncTracker {
    flags: [AtomicBool; DirtyFlag::COUNT],
    suppress_calibration_echo: AtomicBool,
}

impl ConfigSyncTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a tracker to every record it watches.
    pub fn connect(tracker: &Arc<Self>, store: &mut impl ObjectStore) {
        for flag in DirtyFlag::ALL {
            let tracker = Arc::clone(tracker);
            store.subscribe(flag.source(), Box::new(move || tracker.notify(flag)));
        }
    }

    /// Change notification from the object store.
    pub fn notify(&self, flag: DirtyFlag) {
        if flag == DirtyFlag::Calibration
            && self.suppress_calibration_echo.swap(false, Ordering::AcqRel)
        {
            return;
        }
        self.flags[flag as usize].store(true, Ordering::Release);
    }

    pub fn is_dirty(&self, flag: DirtyFlag) -> bool {
        self.flags[flag as usize].load(Ordering::Acquire)
    }

    /// Clear after a confirmed push.
    pub fn clear(&self, flag: DirtyFlag) {
        self.flags[flag as usize].store(false, Ordering::Release);
    }

    /// Swallow the next calibration notification.  Raise immediately before
    /// a self-originated calibration write.
    pub fn suppress_next_calibration_notification(&self) {
        self.suppress_calibration_echo.store(true, Ordering::Release);
    }

    pub fn is_echo_suppressed(&self) -> bool {
        self.suppress_calibration_echo.load(Ordering::Acquire)
    }
}
