//! Board-level drivers.

pub mod watchdog;
