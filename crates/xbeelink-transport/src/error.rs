/// Errors that can occur on the radio link stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial port driver reported an error.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
