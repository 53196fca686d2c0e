//! Status and type codes carried inside response frames.

use serde::Serialize;
use xbeelink_frame::FrameType;

use crate::error::{DecodeError, Result};

/// Outcome of an AT command, local or remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
    InvalidCommand,
    InvalidParameter,
    /// Remote only: the request never reached the target.
    TransmissionFailure,
    /// Remote only.
    NoSecureSession,
    /// Remote only.
    EncryptionError,
    /// Remote only: the command was sent without encryption.
    SentInsecurely,
}

impl CommandStatus {
    /// Decode a local AT response status (codes 0 to 3).
    pub fn local(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(CommandStatus::Ok),
            0x01 => Ok(CommandStatus::Error),
            0x02 => Ok(CommandStatus::InvalidCommand),
            0x03 => Ok(CommandStatus::InvalidParameter),
            _ => Err(DecodeError::UnknownStatus {
                frame_type: FrameType::AtCommandResponse,
                code,
            }),
        }
    }

    /// Decode a remote AT response status.
    pub fn remote(code: u8) -> Result<Self> {
        match code {
            0x04 => Ok(CommandStatus::TransmissionFailure),
            0x0B => Ok(CommandStatus::NoSecureSession),
            0x0C => Ok(CommandStatus::EncryptionError),
            0x0D => Ok(CommandStatus::SentInsecurely),
            _ => Self::local(code).map_err(|_| DecodeError::UnknownStatus {
                frame_type: FrameType::RemoteAtCommandResponse,
                code,
            }),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CommandStatus::Ok => 0x00,
            CommandStatus::Error => 0x01,
            CommandStatus::InvalidCommand => 0x02,
            CommandStatus::InvalidParameter => 0x03,
            CommandStatus::TransmissionFailure => 0x04,
            CommandStatus::NoSecureSession => 0x0B,
            CommandStatus::EncryptionError => 0x0C,
            CommandStatus::SentInsecurely => 0x0D,
        }
    }

    pub fn is_ok(self) -> bool {
        self == CommandStatus::Ok
    }
}

/// Role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Coordinator,
    Router,
    EndDevice,
}

impl DeviceType {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(DeviceType::Coordinator),
            1 => Ok(DeviceType::Router),
            2 => Ok(DeviceType::EndDevice),
            other => Err(DecodeError::UnknownDeviceType(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            DeviceType::Coordinator => 0,
            DeviceType::Router => 1,
            DeviceType::EndDevice => 2,
        }
    }
}

/// Unsolicited modem status (frame type 0x8A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModemStatus {
    HardwareReset,
    WatchdogTimerReset,
    Associated,
    Disassociated,
    SynchronizationLost,
    CoordinatorRealignment,
    CoordinatorStarted,
    NetworkSecurityKeyUpdated,
    VoltageSupplyExceeded,
    ModemConfigChanged,
    /// Codes 0x80 and up: the stack reported an error.
    StackError(u8),
    /// A code not listed above.
    Other(u8),
}

impl ModemStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => ModemStatus::HardwareReset,
            0x01 => ModemStatus::WatchdogTimerReset,
            0x02 => ModemStatus::Associated,
            0x03 => ModemStatus::Disassociated,
            0x04 => ModemStatus::SynchronizationLost,
            0x05 => ModemStatus::CoordinatorRealignment,
            0x06 => ModemStatus::CoordinatorStarted,
            0x07 => ModemStatus::NetworkSecurityKeyUpdated,
            0x0D => ModemStatus::VoltageSupplyExceeded,
            0x11 => ModemStatus::ModemConfigChanged,
            0x80..=0xFF => ModemStatus::StackError(code),
            other => ModemStatus::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_status_range() {
        assert_eq!(CommandStatus::local(0).unwrap(), CommandStatus::Ok);
        assert_eq!(
            CommandStatus::local(3).unwrap(),
            CommandStatus::InvalidParameter
        );
        assert!(matches!(
            CommandStatus::local(4),
            Err(DecodeError::UnknownStatus { code: 4, .. })
        ));
    }

    #[test]
    fn test_remote_status_extends_local() {
        assert_eq!(CommandStatus::remote(1).unwrap(), CommandStatus::Error);
        assert_eq!(
            CommandStatus::remote(4).unwrap(),
            CommandStatus::TransmissionFailure
        );
        assert_eq!(
            CommandStatus::remote(0x0D).unwrap(),
            CommandStatus::SentInsecurely
        );
        assert!(matches!(
            CommandStatus::remote(0x05),
            Err(DecodeError::UnknownStatus {
                frame_type: FrameType::RemoteAtCommandResponse,
                code: 5
            })
        ));
        for status in [CommandStatus::EncryptionError, CommandStatus::NoSecureSession] {
            assert_eq!(CommandStatus::remote(status.code()).unwrap(), status);
        }
    }

    #[test]
    fn test_device_type() {
        assert_eq!(DeviceType::from_code(1).unwrap(), DeviceType::Router);
        assert_eq!(
            DeviceType::from_code(7),
            Err(DecodeError::UnknownDeviceType(7))
        );
    }

    #[test]
    fn test_modem_status() {
        assert_eq!(ModemStatus::from_code(0x06), ModemStatus::CoordinatorStarted);
        assert_eq!(ModemStatus::from_code(0x11), ModemStatus::ModemConfigChanged);
        assert_eq!(ModemStatus::from_code(0x80), ModemStatus::StackError(0x80));
        assert_eq!(ModemStatus::from_code(0xFF), ModemStatus::StackError(0xFF));
        assert_eq!(ModemStatus::from_code(0x08), ModemStatus::Other(0x08));
    }
}
