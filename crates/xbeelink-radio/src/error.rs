use std::time::Duration;

use xbeelink_command::FrameId;

/// Errors that can occur talking to a radio.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] xbeelink_transport::TransportError),

    /// Frame-level error while writing.
    #[error("frame error: {0}")]
    Frame(#[from] xbeelink_frame::FrameError),

    /// The request could not be encoded.
    #[error("invalid request: {0}")]
    Encode(#[from] xbeelink_command::EncodeError),

    /// A synchronous send used frame ID 0, for which no response is sent.
    #[error("frame id 0 never gets a response; allocate one before waiting")]
    NoResponseFrameId,

    /// Another synchronous send is already waiting on this frame ID.
    #[error("frame id {0} already has a pending request")]
    FrameIdInUse(FrameId),

    /// No matching response arrived in time.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The link is closed or the reader has stopped.
    #[error("radio is not connected")]
    NotConnected,

    /// The reader thread could not be started.
    #[error("failed to start reader thread: {0}")]
    ReaderSpawn(#[source] std::io::Error),

    /// Configuration rejected at open.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

impl RadioError {
    /// Whether this is the timeout outcome of a synchronous send.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RadioError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, RadioError>;
