use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::address::{Address16, Address64};
use crate::error::Result;
use crate::fields::Fields;
use crate::hardware::HardwareVersion;
use crate::status::DeviceType;

/// Decoded payload of one AT command response.
///
/// Only meaningful together with the command it answered; the enclosing
/// [`LocalAtResponse`](super::LocalAtResponse) or
/// [`RemoteAtResponse`](super::RemoteAtResponse) carries that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandResponse {
    /// `AI`
    AssociationStatus(u8),
    /// `AP`
    ApiMode(u8),
    /// `CH`
    Channel(u8),
    /// `DB`, in -dBm.
    SignalStrength(u8),
    /// `EE`
    EncryptionEnabled(bool),
    /// `NJ`, in seconds (0xFF: always allow joining).
    JoinTime(u8),
    /// `NC`
    ChildrenRemaining(u8),
    /// `SD`, exponent.
    ScanDuration(u8),
    /// `D0`-`D8`, `P0`-`P2`.
    PinConfiguration(u8),
    /// `HV`
    HardwareVersion(HardwareVersion),
    /// `VR`
    FirmwareVersion(u16),
    /// `MY`
    NetworkAddress(Address16),
    /// `OI`
    PanId(u16),
    /// `NP`
    MaxPayload(u16),
    /// `IR`
    SampleRate(Duration),
    /// `NT`
    DiscoveryTimeout(Duration),
    /// `%V`, in millivolts.
    SupplyVoltage(u16),
    /// `DD`
    DeviceTypeId(u32),
    /// `SH`
    SerialHigh(u32),
    /// `SL`
    SerialLow(u32),
    /// `ID`
    ExtendedPanId(u64),
    /// `OP`
    OperatingPanId(u64),
    /// `NI`
    NodeIdentifier(String),
    /// `ND`, one record per responding node.
    NodeDiscovery(NodeDiscovery),
    /// Any command without a specific decoder.
    Raw(Vec<u8>),
}

/// One node's answer to a node discovery (`ND`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDiscovery {
    pub address16: Address16,
    pub address64: Address64,
    pub identifier: String,
    pub parent: Address16,
    pub device_type: DeviceType,
    pub status: u8,
    pub profile_id: u16,
    pub manufacturer_id: u16,
}

impl NodeDiscovery {
    pub(crate) fn decode(payload: &[u8]) -> Result<Self> {
        let mut fields = Fields::new(payload);
        let address16 = fields.address16("network address")?;
        let address64 = fields.address64("extended address")?;
        let identifier = identifier(fields.c_str()?);
        let parent = fields.address16("parent address")?;
        let device_type = DeviceType::from_code(fields.u8("device type")?)?;
        let status = fields.u8("status")?;
        let profile_id = fields.u16("profile id")?;
        let manufacturer_id = fields.u16("manufacturer id")?;
        Ok(Self {
            address16,
            address64,
            identifier,
            parent,
            device_type,
            status,
            profile_id,
            manufacturer_id,
        })
    }
}

/// `NI` response: the identifier, up to an optional trailing NUL.
pub(crate) fn decode_node_identifier(payload: &[u8]) -> Result<CommandResponse> {
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    Ok(CommandResponse::NodeIdentifier(identifier(&payload[..end])))
}

pub(crate) fn decode_node_discovery(payload: &[u8]) -> Result<CommandResponse> {
    NodeDiscovery::decode(payload).map(CommandResponse::NodeDiscovery)
}

/// Node identifiers are printable ASCII; anything else becomes `?`.
pub(crate) fn identifier(raw: &[u8]) -> String {
    let text: String = raw
        .iter()
        .map(|&b| {
            if (32..=126).contains(&b) {
                b as char
            } else {
                '?'
            }
        })
        .collect();
    if raw.iter().any(|b| !(32..=126).contains(b)) {
        warn!(identifier = %text, "node identifier contains non-printable bytes");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    const HVAC_RECORD: [u8; 29] = [
        0xAE, 0x38, 0x00, 0x13, 0xA2, 0x00, 0x40, 0x2D, 0x03, 0x0D, b'H', b'V', b'A', b'C', b'-',
        b'T', b'R', b'A', b'N', b'E', 0x00, 0xFF, 0xFE, 0x01, 0x00, 0xC1, 0x05, 0x10, 0x1E,
    ];

    #[test]
    fn test_node_discovery_record() {
        let record = NodeDiscovery::decode(&HVAC_RECORD).unwrap();
        assert_eq!(record.address16, Address16(0xAE38));
        assert_eq!(record.address64, Address64(0x0013_A200_402D_030D));
        assert_eq!(record.identifier, "HVAC-TRANE");
        assert_eq!(record.parent, Address16::UNKNOWN);
        assert_eq!(record.device_type, DeviceType::Router);
        assert_eq!(record.status, 0);
        assert_eq!(record.profile_id, 0xC105);
        assert_eq!(record.manufacturer_id, 0x101E);
    }

    #[test]
    fn test_node_discovery_truncated() {
        let err = NodeDiscovery::decode(&HVAC_RECORD[..26]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                what: "profile id",
                ..
            }
        ));
    }

    #[test]
    fn test_node_discovery_unknown_device_type() {
        let mut record = HVAC_RECORD;
        record[23] = 0x09;
        assert_eq!(
            NodeDiscovery::decode(&record).unwrap_err(),
            DecodeError::UnknownDeviceType(0x09)
        );
    }

    #[test]
    fn test_node_discovery_unterminated_identifier() {
        let err = NodeDiscovery::decode(&HVAC_RECORD[..20]).unwrap_err();
        assert_eq!(err, DecodeError::UnterminatedIdentifier);
    }

    #[test]
    fn test_identifier_replaces_non_printable() {
        assert_eq!(identifier(b"NODE\x07\xC3"), "NODE??");
        assert_eq!(identifier(b" ~"), " ~");
    }

    #[test]
    fn test_node_identifier_stops_at_nul() {
        assert_eq!(
            decode_node_identifier(b"COORDINATOR").unwrap(),
            CommandResponse::NodeIdentifier("COORDINATOR".into())
        );
        assert_eq!(
            decode_node_identifier(b"ROUTER\0junk").unwrap(),
            CommandResponse::NodeIdentifier("ROUTER".into())
        );
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(CommandResponse::Channel(0x14)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "channel", "value": 20}));
    }
}
