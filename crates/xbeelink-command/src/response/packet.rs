use serde::Serialize;

use crate::address::{Address16, Address64};
use crate::error::Result;
use crate::fields::Fields;
use crate::frame_id::FrameId;
use crate::response::command::identifier;
use crate::status::DeviceType;

/// Delivery report for a transmit request (0x8B).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransmitStatus {
    pub frame_id: FrameId,
    pub destination16: Address16,
    pub retry_count: u8,
    pub delivery_status: u8,
    pub discovery_status: u8,
}

impl TransmitStatus {
    pub(crate) fn decode(data: &[u8]) -> Result<Self> {
        let mut fields = Fields::new(data);
        Ok(Self {
            frame_id: FrameId(fields.u8("frame id")?),
            destination16: fields.address16("destination network address")?,
            retry_count: fields.u8("retry count")?,
            delivery_status: fields.u8("delivery status")?,
            discovery_status: fields.u8("discovery status")?,
        })
    }

    pub fn is_delivered(&self) -> bool {
        self.delivery_status == 0
    }
}

/// RF data received from another node (0x90).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivePacket {
    pub source64: Address64,
    pub source16: Address16,
    pub options: u8,
    pub data: Vec<u8>,
}

impl ReceivePacket {
    pub(crate) fn decode(data: &[u8]) -> Result<Self> {
        let mut fields = Fields::new(data);
        Ok(Self {
            source64: fields.address64("source address")?,
            source16: fields.address16("source network address")?,
            options: fields.u8("receive options")?,
            data: fields.rest().to_vec(),
        })
    }

    /// Whether the packet was sent as a broadcast.
    pub fn is_broadcast(&self) -> bool {
        self.options & 0x02 != 0
    }
}

/// A node announced itself, e.g. after its commissioning button was
/// pressed or it joined the network (0x95).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeIdentification {
    pub source64: Address64,
    pub source16: Address16,
    pub options: u8,
    pub remote16: Address16,
    pub remote64: Address64,
    pub identifier: String,
    pub parent: Address16,
    pub device_type: DeviceType,
    /// 1: button, 2: joined, 3: power cycle.
    pub source_event: u8,
    pub profile_id: u16,
    pub manufacturer_id: u16,
}

impl NodeIdentification {
    pub(crate) fn decode(data: &[u8]) -> Result<Self> {
        let mut fields = Fields::new(data);
        let source64 = fields.address64("source address")?;
        let source16 = fields.address16("source network address")?;
        let options = fields.u8("receive options")?;
        let remote16 = fields.address16("remote network address")?;
        let remote64 = fields.address64("remote address")?;
        let identifier = identifier(fields.c_str()?);
        let parent = fields.address16("parent address")?;
        let device_type = DeviceType::from_code(fields.u8("device type")?)?;
        let source_event = fields.u8("source event")?;
        let profile_id = fields.u16("profile id")?;
        let manufacturer_id = fields.u16("manufacturer id")?;
        Ok(Self {
            source64,
            source16,
            options,
            remote16,
            remote64,
            identifier,
            parent,
            device_type,
            source_event,
            profile_id,
            manufacturer_id,
        })
    }
}
