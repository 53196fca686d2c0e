//! Byte-stream abstraction for XBee radio links.
//!
//! The radio speaks its API protocol over any ordered duplex byte stream:
//! - a serial port (behind the `serial` feature)
//! - a TCP bridge such as `ser2net`
//! - a Unix socket (handy for simulators and tests)
//!
//! This is the lowest layer of xbeelink. Opening the physical port is the
//! caller's business; everything above works on the [`XbeeStream`] handed in.

pub mod error;
pub mod stream;

pub use error::{Result, TransportError};
pub use stream::XbeeStream;
