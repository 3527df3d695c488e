//! Flight-controller side of the AHRS coprocessor link.
//!
//! Exposes the session logic, wire protocol and adapters for integration
//! testing and for the ESP-IDF binary.  ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod gps;
pub mod nav;
pub mod objects;
pub mod pins;
pub mod proto;
pub mod tracker;
