//! API frame types.
//!
//! The first logical byte of every frame names its type. Codes below `0x80`
//! travel from host to radio; codes from `0x80` up travel back, except for
//! the legacy Series 1 frames whose direction is not tracked.

use std::fmt;

/// Which way a frame type travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to radio.
    Transmit,
    /// Radio to host.
    Receive,
    /// Legacy frame; direction not tracked.
    Unknown,
}

/// Known API frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FrameType {
    Tx64Request = 0x00,
    Tx16Request = 0x01,
    AtCommand = 0x08,
    AtCommandQueue = 0x09,
    TransmitRequest = 0x10,
    ExplicitAddressing = 0x11,
    RemoteAtCommand = 0x17,
    CreateSourceRoute = 0x21,
    Rx64Indicator = 0x80,
    Rx16Indicator = 0x81,
    Rx64IoSample = 0x82,
    Rx16IoSample = 0x83,
    AtCommandResponse = 0x88,
    TxStatus = 0x89,
    ModemStatus = 0x8A,
    TransmitStatus = 0x8B,
    ReceivePacket = 0x90,
    ExplicitRxIndicator = 0x91,
    IoSampleIndicator = 0x92,
    SensorReadIndicator = 0x94,
    NodeIdentification = 0x95,
    RemoteAtCommandResponse = 0x97,
    ExtendedModemStatus = 0x98,
    OtaFirmwareUpdateStatus = 0xA0,
    RouteRecordIndicator = 0xA1,
    ManyToOneRouteRequest = 0xA3,
}

impl FrameType {
    /// Every known frame type, in code order.
    pub const ALL: [FrameType; 26] = [
        FrameType::Tx64Request,
        FrameType::Tx16Request,
        FrameType::AtCommand,
        FrameType::AtCommandQueue,
        FrameType::TransmitRequest,
        FrameType::ExplicitAddressing,
        FrameType::RemoteAtCommand,
        FrameType::CreateSourceRoute,
        FrameType::Rx64Indicator,
        FrameType::Rx16Indicator,
        FrameType::Rx64IoSample,
        FrameType::Rx16IoSample,
        FrameType::AtCommandResponse,
        FrameType::TxStatus,
        FrameType::ModemStatus,
        FrameType::TransmitStatus,
        FrameType::ReceivePacket,
        FrameType::ExplicitRxIndicator,
        FrameType::IoSampleIndicator,
        FrameType::SensorReadIndicator,
        FrameType::NodeIdentification,
        FrameType::RemoteAtCommandResponse,
        FrameType::ExtendedModemStatus,
        FrameType::OtaFirmwareUpdateStatus,
        FrameType::RouteRecordIndicator,
        FrameType::ManyToOneRouteRequest,
    ];

    /// Look up a frame type by its wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|ft| ft.code() == code)
    }

    /// The wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Which way this frame type travels.
    pub fn direction(self) -> Direction {
        match self {
            FrameType::AtCommand
            | FrameType::AtCommandQueue
            | FrameType::TransmitRequest
            | FrameType::ExplicitAddressing
            | FrameType::RemoteAtCommand
            | FrameType::CreateSourceRoute => Direction::Transmit,
            FrameType::AtCommandResponse
            | FrameType::ModemStatus
            | FrameType::TransmitStatus
            | FrameType::ReceivePacket
            | FrameType::ExplicitRxIndicator
            | FrameType::IoSampleIndicator
            | FrameType::SensorReadIndicator
            | FrameType::NodeIdentification
            | FrameType::RemoteAtCommandResponse
            | FrameType::ExtendedModemStatus
            | FrameType::OtaFirmwareUpdateStatus
            | FrameType::RouteRecordIndicator
            | FrameType::ManyToOneRouteRequest => Direction::Receive,
            FrameType::Tx64Request
            | FrameType::Tx16Request
            | FrameType::Rx64Indicator
            | FrameType::Rx16Indicator
            | FrameType::Rx64IoSample
            | FrameType::Rx16IoSample
            | FrameType::TxStatus => Direction::Unknown,
        }
    }

    /// Whether the body starts with a frame ID byte.
    pub fn has_frame_id(self) -> bool {
        matches!(
            self,
            FrameType::Tx64Request
                | FrameType::Tx16Request
                | FrameType::AtCommand
                | FrameType::AtCommandQueue
                | FrameType::TransmitRequest
                | FrameType::ExplicitAddressing
                | FrameType::RemoteAtCommand
                | FrameType::CreateSourceRoute
                | FrameType::AtCommandResponse
                | FrameType::TxStatus
                | FrameType::TransmitStatus
                | FrameType::RemoteAtCommandResponse
        )
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            FrameType::Tx64Request => "TX (transmit) request: 64-bit address",
            FrameType::Tx16Request => "TX (transmit) request: 16-bit address",
            FrameType::AtCommand => "AT command",
            FrameType::AtCommandQueue => "AT command - queue parameter value",
            FrameType::TransmitRequest => "Transmit request",
            FrameType::ExplicitAddressing => "Explicit addressing command frame",
            FrameType::RemoteAtCommand => "Remote AT command request",
            FrameType::CreateSourceRoute => "Create source route",
            FrameType::Rx64Indicator => "RX (receive) packet: 64-bit address",
            FrameType::Rx16Indicator => "RX (receive) packet: 16-bit address",
            FrameType::Rx64IoSample => "RX (receive) packet: 64-bit address IO",
            FrameType::Rx16IoSample => "RX (receive) packet: 16-bit address IO",
            FrameType::AtCommandResponse => "AT command response",
            FrameType::TxStatus => "TX (transmit) status",
            FrameType::ModemStatus => "Modem status",
            FrameType::TransmitStatus => "Transmit status",
            FrameType::ReceivePacket => "Receive packet",
            FrameType::ExplicitRxIndicator => "Explicit RX indicator",
            FrameType::IoSampleIndicator => "IO data sample RX indicator",
            FrameType::SensorReadIndicator => "XBee sensor read indicator",
            FrameType::NodeIdentification => "Node identification indicator",
            FrameType::RemoteAtCommandResponse => "Remote command response",
            FrameType::ExtendedModemStatus => "Extended modem status",
            FrameType::OtaFirmwareUpdateStatus => "Over-the-air firmware update status",
            FrameType::RouteRecordIndicator => "Route record indicator",
            FrameType::ManyToOneRouteRequest => "Many-to-one route request indicator",
        }
    }
}

impl TryFrom<u8> for FrameType {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_code(code).ok_or(code)
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.description(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_roundtrips_table() {
        for ft in FrameType::ALL {
            assert_eq!(FrameType::from_code(ft.code()), Some(ft));
        }
    }

    #[test]
    fn test_table_is_sorted_and_unique() {
        let codes: Vec<u8> = FrameType::ALL.iter().map(|ft| ft.code()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_unmapped_codes() {
        assert_eq!(FrameType::from_code(0x03), None);
        assert_eq!(FrameType::from_code(0xFF), None);
        assert_eq!(FrameType::try_from(0x03), Err(0x03));
    }

    #[test]
    fn test_directions() {
        assert_eq!(FrameType::AtCommand.direction(), Direction::Transmit);
        assert_eq!(FrameType::RemoteAtCommand.direction(), Direction::Transmit);
        assert_eq!(FrameType::AtCommandResponse.direction(), Direction::Receive);
        assert_eq!(FrameType::NodeIdentification.direction(), Direction::Receive);
        assert_eq!(FrameType::TxStatus.direction(), Direction::Unknown);
    }

    #[test]
    fn test_correct_codes_for_explicit_and_node_identification() {
        assert_eq!(FrameType::ExplicitAddressing.code(), 0x11);
        assert_eq!(FrameType::NodeIdentification.code(), 0x95);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FrameType::AtCommandResponse.to_string(),
            "AT command response (0x88)"
        );
    }
}
