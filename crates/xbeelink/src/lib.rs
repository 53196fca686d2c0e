//! Client side of the XBee API-mode protocol.
//!
//! Talks to a radio module over a serial line (or a TCP bridge to one):
//! frames are length-prefixed, byte-stuffed and checksummed, and requests
//! are matched to their responses by a one-byte frame ID.
//!
//! # Crate Structure
//!
//! - [`transport`]: Duplex byte stream over serial, TCP or a socket pair
//! - [`frame`]: Byte stuffing, checksums, frame reader/writer, async codec
//! - [`command`]: AT command catalog, typed responses, request encoding
//! - [`radio`]: Reader thread, backlog, subscribers and synchronous sends
//!   (behind `radio` feature)

/// Re-export transport types.
pub mod transport {
    pub use xbeelink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use xbeelink_frame::*;
}

/// Re-export command types.
pub mod command {
    pub use xbeelink_command::*;
}

/// Re-export radio types (requires `radio` feature).
#[cfg(feature = "radio")]
pub mod radio {
    pub use xbeelink_radio::*;
}
