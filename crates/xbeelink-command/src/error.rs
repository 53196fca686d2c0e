use xbeelink_frame::FrameType;

use crate::command::AtCommand;

/// Errors turning a verified frame into a typed response.
///
/// None of these affect stream synchronization: the frame was already
/// delimited and checksummed when decoding started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The frame type byte is not in the frame type table.
    #[error("unknown frame type 0x{0:02X}")]
    UnknownFrameType(u8),

    /// The frame type is known but nothing decodes it.
    #[error("no decoder for frame type {0}")]
    NoDecoder(FrameType),

    /// The two command bytes are not in the AT command catalog.
    #[error("unknown AT command {:?}", String::from_utf8_lossy(.0))]
    UnknownCommand([u8; 2]),

    /// The status byte is not valid for this frame type.
    #[error("unknown status 0x{code:02X} in {frame_type}")]
    UnknownStatus { frame_type: FrameType, code: u8 },

    /// The device type code is not coordinator, router or end device.
    #[error("unknown device type 0x{0:02X}")]
    UnknownDeviceType(u8),

    /// The body ended before a field was complete.
    #[error("truncated {what}: need {needed} bytes, have {available}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// A node identifier ran to the end of the body without a NUL.
    #[error("node identifier is not NUL-terminated")]
    UnterminatedIdentifier,
}

/// Errors building an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The parameter value is too long for the command.
    #[error("{len}-byte value is too long for {command} (max {max})")]
    InvalidValueLength {
        command: AtCommand,
        len: usize,
        max: usize,
    },

    /// A node identifier contains a byte outside printable ASCII.
    #[error("node identifier byte 0x{0:02X} is not printable ASCII")]
    InvalidIdentifier(u8),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
