//! Outbound request frames.
//!
//! Each request kind builds its frame body; [`Request::encode`] turns any of
//! them into a [`RawFrame`] ready for a frame writer, which adds the start
//! marker, length, stuffing and checksum.

use bytes::{BufMut, BytesMut};
use xbeelink_frame::{FrameType, RawFrame};

use crate::address::{Address16, Address64};
use crate::command::AtCommand;
use crate::error::EncodeError;
use crate::frame_id::FrameId;

/// Longest parameter value for most commands.
pub const MAX_VALUE_LEN: usize = 4;

/// Longest node identifier accepted by `NI`.
pub const MAX_IDENTIFIER_LEN: usize = 20;

/// Remote AT option bit: apply the change immediately.
const APPLY_CHANGES: u8 = 0x02;

fn check_value(command: AtCommand, value: &[u8]) -> Result<(), EncodeError> {
    let max = if command == AtCommand::Ni {
        MAX_IDENTIFIER_LEN
    } else {
        MAX_VALUE_LEN
    };
    if value.len() > max {
        return Err(EncodeError::InvalidValueLength {
            command,
            len: value.len(),
            max,
        });
    }
    if command == AtCommand::Ni {
        if let Some(&bad) = value.iter().find(|b| !(32..=126).contains(*b)) {
            return Err(EncodeError::InvalidIdentifier(bad));
        }
    }
    Ok(())
}

/// Big-endian bytes of `value` without leading zeros; zero is one byte.
pub fn value_from_u32(value: u32) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take(3).take_while(|&&b| b == 0).count();
    bytes[skip..].to_vec()
}

/// AT command for the directly attached radio (0x08, or 0x09 when queued).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRequest {
    pub frame_id: FrameId,
    pub command: AtCommand,
    pub value: Vec<u8>,
    /// Hold the change until `AC` or `WR` instead of applying it.
    pub queued: bool,
}

impl AtRequest {
    /// A query: no parameter value.
    pub fn query(command: AtCommand) -> Self {
        Self {
            frame_id: FrameId::DEFAULT,
            command,
            value: Vec::new(),
            queued: false,
        }
    }

    /// Set a parameter to raw bytes.
    pub fn set(command: AtCommand, value: impl Into<Vec<u8>>) -> Result<Self, EncodeError> {
        let value = value.into();
        check_value(command, &value)?;
        Ok(Self {
            value,
            ..Self::query(command)
        })
    }

    /// Set a numeric parameter, encoded in as few bytes as it needs.
    pub fn set_u32(command: AtCommand, value: u32) -> Result<Self, EncodeError> {
        Self::set(command, value_from_u32(value))
    }

    pub fn with_frame_id(mut self, frame_id: FrameId) -> Self {
        self.frame_id = frame_id;
        self
    }

    pub fn queued(mut self) -> Self {
        self.queued = true;
        self
    }

    pub fn frame_type(&self) -> FrameType {
        if self.queued {
            FrameType::AtCommandQueue
        } else {
            FrameType::AtCommand
        }
    }

    fn put_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.frame_id.get());
        dst.put_slice(&self.command.code());
        dst.put_slice(&self.value);
    }
}

/// AT command relayed to another radio (0x17).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtRequest {
    pub frame_id: FrameId,
    pub destination64: Address64,
    pub destination16: Address16,
    pub apply_changes: bool,
    pub command: AtCommand,
    pub value: Vec<u8>,
}

impl RemoteAtRequest {
    /// Query a remote radio by its extended address. Changes are applied
    /// immediately unless [`deferred`](Self::deferred) is called.
    pub fn query(destination64: Address64, command: AtCommand) -> Self {
        Self {
            frame_id: FrameId::DEFAULT,
            destination64,
            destination16: Address16::UNKNOWN,
            apply_changes: true,
            command,
            value: Vec::new(),
        }
    }

    pub fn set(
        destination64: Address64,
        command: AtCommand,
        value: impl Into<Vec<u8>>,
    ) -> Result<Self, EncodeError> {
        let value = value.into();
        check_value(command, &value)?;
        Ok(Self {
            value,
            ..Self::query(destination64, command)
        })
    }

    pub fn set_u32(
        destination64: Address64,
        command: AtCommand,
        value: u32,
    ) -> Result<Self, EncodeError> {
        Self::set(destination64, command, value_from_u32(value))
    }

    pub fn with_frame_id(mut self, frame_id: FrameId) -> Self {
        self.frame_id = frame_id;
        self
    }

    pub fn with_destination16(mut self, destination16: Address16) -> Self {
        self.destination16 = destination16;
        self
    }

    /// Leave the change pending on the remote radio.
    pub fn deferred(mut self) -> Self {
        self.apply_changes = false;
        self
    }

    fn put_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.frame_id.get());
        dst.put_slice(&self.destination64.to_be_bytes());
        dst.put_slice(&self.destination16.to_be_bytes());
        dst.put_u8(if self.apply_changes { APPLY_CHANGES } else { 0 });
        dst.put_slice(&self.command.code());
        dst.put_slice(&self.value);
    }
}

/// RF data for another node (0x10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    pub frame_id: FrameId,
    pub destination64: Address64,
    pub destination16: Address16,
    /// Maximum hops for a broadcast; 0 uses the network maximum.
    pub broadcast_radius: u8,
    pub options: u8,
    pub data: Vec<u8>,
}

impl TransmitRequest {
    pub fn new(destination64: Address64, data: impl Into<Vec<u8>>) -> Self {
        Self {
            frame_id: FrameId::DEFAULT,
            destination64,
            destination16: Address16::UNKNOWN,
            broadcast_radius: 0,
            options: 0,
            data: data.into(),
        }
    }

    /// Send to every node on the network.
    pub fn broadcast(data: impl Into<Vec<u8>>) -> Self {
        Self::new(Address64::BROADCAST, data)
    }

    pub fn with_frame_id(mut self, frame_id: FrameId) -> Self {
        self.frame_id = frame_id;
        self
    }

    fn put_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.frame_id.get());
        dst.put_slice(&self.destination64.to_be_bytes());
        dst.put_slice(&self.destination16.to_be_bytes());
        dst.put_u8(self.broadcast_radius);
        dst.put_u8(self.options);
        dst.put_slice(&self.data);
    }
}

/// Any outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    At(AtRequest),
    RemoteAt(RemoteAtRequest),
    Transmit(TransmitRequest),
}

impl Request {
    pub fn frame_id(&self) -> FrameId {
        match self {
            Request::At(r) => r.frame_id,
            Request::RemoteAt(r) => r.frame_id,
            Request::Transmit(r) => r.frame_id,
        }
    }

    pub fn set_frame_id(&mut self, frame_id: FrameId) {
        match self {
            Request::At(r) => r.frame_id = frame_id,
            Request::RemoteAt(r) => r.frame_id = frame_id,
            Request::Transmit(r) => r.frame_id = frame_id,
        }
    }

    pub fn frame_type(&self) -> FrameType {
        match self {
            Request::At(r) => r.frame_type(),
            Request::RemoteAt(_) => FrameType::RemoteAtCommand,
            Request::Transmit(_) => FrameType::TransmitRequest,
        }
    }

    /// The AT command carried, if any.
    pub fn command(&self) -> Option<AtCommand> {
        match self {
            Request::At(r) => Some(r.command),
            Request::RemoteAt(r) => Some(r.command),
            Request::Transmit(_) => None,
        }
    }

    /// Build the unstuffed frame: type byte plus body.
    pub fn encode(&self) -> RawFrame {
        let mut body = BytesMut::with_capacity(32);
        match self {
            Request::At(r) => r.put_body(&mut body),
            Request::RemoteAt(r) => r.put_body(&mut body),
            Request::Transmit(r) => r.put_body(&mut body),
        }
        RawFrame::new(self.frame_type().code(), body.freeze())
    }
}

impl From<AtRequest> for Request {
    fn from(request: AtRequest) -> Self {
        Request::At(request)
    }
}

impl From<RemoteAtRequest> for Request {
    fn from(request: RemoteAtRequest) -> Self {
        Request::RemoteAt(request)
    }
}

impl From<TransmitRequest> for Request {
    fn from(request: TransmitRequest) -> Self {
        Request::Transmit(request)
    }
}
