/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame checksum did not verify. The frame was discarded.
    #[error("checksum mismatch (expected 0x{expected:02X}, got 0x{actual:02X})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// A frame declared zero length, so it carries no type byte.
    #[error("empty frame (zero length field)")]
    EmptyFrame,

    /// The frame is longer than the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The stream ended part way through a frame.
    #[error("connection closed mid-frame (read {offset} of {expected} bytes)")]
    Truncated { offset: usize, expected: usize },

    /// The stream ended right after an escape marker.
    #[error("connection closed inside an escape sequence at offset {offset}")]
    TruncatedEscape { offset: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying transport reported an error.
    #[error(transparent)]
    Transport(#[from] xbeelink_transport::TransportError),

    /// The connection was closed at a frame boundary.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Whether the stream is still usable after this error.
    ///
    /// Recoverable errors have already consumed the offending bytes; the next
    /// read resumes at the following start marker. Everything else means the
    /// stream can no longer be trusted.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::ChecksumMismatch { .. }
                | FrameError::EmptyFrame
                | FrameError::FrameTooLarge { .. }
        )
    }

    /// Whether this is a read timeout rather than a failure.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrameError::Io(err)
                if matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
