//! Application core: session orchestration with zero direct I/O.
//!
//! The comms session state machine runs inside [`service`].  All
//! interaction with the coprocessor, the object store and time happens
//! through **port traits** defined in [`ports`], keeping this layer
//! testable without hardware.

pub mod events;
pub mod ports;
pub mod service;
