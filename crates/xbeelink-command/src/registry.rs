//! Payload decoder lookup.
//!
//! Maps `(frame type, AT command)` to the decoder for that command's
//! response payload. The same table serves local (0x88) and remote (0x97)
//! responses; entries can differ between them.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;
use xbeelink_frame::{FrameType, RawFrame};

use crate::address::Address16;
use crate::command::AtCommand;
use crate::error::{DecodeError, Result};
use crate::fields::Fields;
use crate::hardware::HardwareVersion;
use crate::response::command::{decode_node_discovery, decode_node_identifier};
use crate::response::{
    CommandResponse, IoSample, LocalAtResponse, NodeIdentification, ReceivePacket,
    RemoteAtResponse, ResponseFrame, TransmitStatus,
};
use crate::status::ModemStatus;

/// How to turn a command payload into a [`CommandResponse`].
///
/// The fixed-width variants read a big-endian integer of their size and
/// hand it to the wrapping function.
#[derive(Clone, Copy)]
pub enum Decoder {
    Byte(fn(u8) -> CommandResponse),
    Word(fn(u16) -> CommandResponse),
    Quad(fn(u32) -> CommandResponse),
    Long(fn(u64) -> CommandResponse),
    Custom(fn(&[u8]) -> Result<CommandResponse>),
    Raw,
}

impl Decoder {
    /// Decode a non-empty payload. Bytes past a fixed-width value are ignored.
    pub fn decode(&self, payload: &[u8]) -> Result<CommandResponse> {
        let mut fields = Fields::new(payload);
        let response = match self {
            Decoder::Byte(wrap) => wrap(fields.u8("value")?),
            Decoder::Word(wrap) => wrap(fields.u16("value")?),
            Decoder::Quad(wrap) => wrap(fields.u32("value")?),
            Decoder::Long(wrap) => wrap(fields.u64("value")?),
            Decoder::Custom(decode) => return decode(payload),
            Decoder::Raw => return Ok(CommandResponse::Raw(payload.to_vec())),
        };
        if !fields.is_empty() {
            debug!(extra = fields.rest().len(), "ignoring bytes after fixed-width value");
        }
        Ok(response)
    }

    fn kind(&self) -> &'static str {
        match self {
            Decoder::Byte(_) => "byte",
            Decoder::Word(_) => "word",
            Decoder::Quad(_) => "quad",
            Decoder::Long(_) => "long",
            Decoder::Custom(_) => "custom",
            Decoder::Raw => "raw",
        }
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// Decoder table plus the frame-level decoding built on it.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    decoders: HashMap<(FrameType, AtCommand), Decoder>,
}

impl CommandRegistry {
    /// A registry with no command decoders; every payload decodes as raw bytes.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register (or replace) a decoder for local and remote responses alike.
    pub fn register(&mut self, command: AtCommand, decoder: Decoder) {
        self.register_for(FrameType::AtCommandResponse, command, decoder);
        self.register_for(FrameType::RemoteAtCommandResponse, command, decoder);
    }

    /// Register (or replace) a decoder for one frame type only.
    pub fn register_for(&mut self, frame_type: FrameType, command: AtCommand, decoder: Decoder) {
        self.decoders.insert((frame_type, command), decoder);
    }

    /// Look up the decoder for a command. Unregistered commands decode raw.
    pub fn decoder(&self, frame_type: FrameType, command: AtCommand) -> Decoder {
        self.decoders
            .get(&(frame_type, command))
            .copied()
            .unwrap_or(Decoder::Raw)
    }

    /// Decode a command payload. An empty payload (a set acknowledgement or
    /// a status-only reply) yields `None`.
    pub fn decode_command(
        &self,
        frame_type: FrameType,
        command: AtCommand,
        payload: &[u8],
    ) -> Result<Option<CommandResponse>> {
        if payload.is_empty() {
            return Ok(None);
        }
        self.decoder(frame_type, command).decode(payload).map(Some)
    }

    /// Decode a verified frame into a typed response.
    pub fn decode(&self, frame: &RawFrame) -> Result<ResponseFrame> {
        let frame_type = frame
            .kind()
            .ok_or(DecodeError::UnknownFrameType(frame.frame_type))?;
        let data = frame.data.as_ref();
        match frame_type {
            FrameType::AtCommandResponse => {
                LocalAtResponse::decode(data, self).map(ResponseFrame::LocalAt)
            }
            FrameType::RemoteAtCommandResponse => {
                RemoteAtResponse::decode(data, self).map(ResponseFrame::RemoteAt)
            }
            FrameType::ModemStatus => {
                let code = Fields::new(data).u8("modem status")?;
                Ok(ResponseFrame::ModemStatus {
                    status: ModemStatus::from_code(code),
                })
            }
            FrameType::TransmitStatus => {
                TransmitStatus::decode(data).map(ResponseFrame::TransmitStatus)
            }
            FrameType::ReceivePacket => ReceivePacket::decode(data).map(ResponseFrame::Receive),
            FrameType::IoSampleIndicator => IoSample::decode(data).map(ResponseFrame::IoSample),
            FrameType::NodeIdentification => {
                NodeIdentification::decode(data).map(ResponseFrame::NodeIdentification)
            }
            other => Err(DecodeError::NoDecoder(other)),
        }
    }
}

impl Default for CommandRegistry {
    /// The standard decoder table.
    fn default() -> Self {
        use AtCommand::*;

        let mut registry = Self::empty();

        registry.register(Ai, Decoder::Byte(CommandResponse::AssociationStatus));
        registry.register(Ap, Decoder::Byte(CommandResponse::ApiMode));
        registry.register(Ch, Decoder::Byte(CommandResponse::Channel));
        registry.register(Db, Decoder::Byte(CommandResponse::SignalStrength));
        registry.register(Ee, Decoder::Byte(|v| CommandResponse::EncryptionEnabled(v != 0)));
        registry.register(Nj, Decoder::Byte(CommandResponse::JoinTime));
        registry.register(Nc, Decoder::Byte(CommandResponse::ChildrenRemaining));
        registry.register(Sd, Decoder::Byte(CommandResponse::ScanDuration));
        for pin in [D0, D1, D2, D3, D4, D5, D6, D7, D8, P0, P1, P2] {
            registry.register(pin, Decoder::Byte(CommandResponse::PinConfiguration));
        }

        registry.register(
            Hv,
            Decoder::Word(|v| CommandResponse::HardwareVersion(HardwareVersion(v))),
        );
        registry.register(Vr, Decoder::Word(CommandResponse::FirmwareVersion));
        registry.register(
            My,
            Decoder::Word(|v| CommandResponse::NetworkAddress(Address16(v))),
        );
        registry.register(Oi, Decoder::Word(CommandResponse::PanId));
        registry.register(Np, Decoder::Word(CommandResponse::MaxPayload));
        registry.register(
            Ir,
            Decoder::Word(|v| CommandResponse::SampleRate(Duration::from_millis(v.into()))),
        );
        registry.register(
            Nt,
            Decoder::Word(|v| {
                CommandResponse::DiscoveryTimeout(Duration::from_millis(u64::from(v) * 100))
            }),
        );
        registry.register(SupplyVoltage, Decoder::Word(CommandResponse::SupplyVoltage));

        registry.register(Dd, Decoder::Quad(CommandResponse::DeviceTypeId));
        registry.register(Sh, Decoder::Quad(CommandResponse::SerialHigh));
        registry.register(Sl, Decoder::Quad(CommandResponse::SerialLow));

        registry.register(Id, Decoder::Long(CommandResponse::ExtendedPanId));
        registry.register(Op, Decoder::Long(CommandResponse::OperatingPanId));

        registry.register(Ni, Decoder::Custom(decode_node_identifier));
        registry.register(Nd, Decoder::Custom(decode_node_discovery));

        registry
    }
}
