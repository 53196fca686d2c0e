use std::fmt;
use std::io;

use xbeelink_command::EncodeError;
use xbeelink_frame::FrameError;
use xbeelink_radio::RadioError;
use xbeelink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn serial_error(context: &str, err: serialport::Error) -> CliError {
    let code = match err.kind() {
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
        serialport::ErrorKind::InvalidInput => USAGE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::Serial(source) => serial_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Transport(source) => transport_error(context, source),
        FrameError::FrameTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn encode_error(context: &str, err: EncodeError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn radio_error(context: &str, err: RadioError) -> CliError {
    match err {
        RadioError::Transport(err) => transport_error(context, err),
        RadioError::Frame(err) => frame_error(context, err),
        RadioError::Encode(err) => encode_error(context, err),
        RadioError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        RadioError::NotConnected => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        RadioError::NoResponseFrameId
        | RadioError::FrameIdInUse(_)
        | RadioError::InvalidConfig(_) => CliError::new(USAGE, format!("{context}: {err}")),
        RadioError::ReaderSpawn(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeout_maps_to_124() {
        let err = radio_error("at HV", RadioError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("at HV: "));
    }

    #[test]
    fn io_kinds_map_to_codes() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(io_error("open", denied).code, PERMISSION_DENIED);
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            radio_error("open", RadioError::Transport(TransportError::Io(refused))).code,
            TRANSPORT_ERROR
        );
    }

    #[test]
    fn corrupt_stream_is_data_invalid() {
        let err = frame_error(
            "read",
            FrameError::TruncatedEscape { offset: 4 },
        );
        assert_eq!(err.code, DATA_INVALID);
    }
}
