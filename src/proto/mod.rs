//! Coprocessor wire protocol: message types, framing and record marshalling.

pub mod codec;
pub mod marshal;
pub mod messages;

pub use messages::{MessageKind, Request, Response};
