//! XBee API frame codec.
//!
//! Every API frame on the wire is laid out as:
//! - a `0x7E` start marker for stream synchronization
//! - a 2-byte big-endian length counting the frame type and body
//! - the frame type byte and body
//! - a one-byte checksum
//!
//! Everything after the length field is byte-stuffed (API mode 2), so the
//! start marker never appears inside a frame. The assembler in this crate
//! hides escaping, checksums and resynchronization: callers only ever see
//! complete, verified [`RawFrame`]s.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod escape;
pub mod frame_type;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::XbeeCodec;
pub use checksum::{checksum, verify};
pub use codec::{
    decode_frame, encode_frame, eof_error, skip_to_start, FrameConfig, RawFrame, MAX_FRAME_LEN,
};
pub use error::{FrameError, Result};
pub use escape::{ESCAPE, START, XOFF, XON};
pub use frame_type::{Direction, FrameType};
pub use reader::FrameReader;
pub use writer::FrameWriter;
