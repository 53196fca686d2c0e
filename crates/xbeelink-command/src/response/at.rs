use serde::Serialize;
use xbeelink_frame::FrameType;

use crate::address::{Address16, Address64};
use crate::command::AtCommand;
use crate::error::{DecodeError, Result};
use crate::fields::Fields;
use crate::frame_id::FrameId;
use crate::registry::CommandRegistry;
use crate::response::CommandResponse;
use crate::status::CommandStatus;

/// Response to a local AT command (0x88).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalAtResponse {
    pub frame_id: FrameId,
    pub command: AtCommand,
    pub status: CommandStatus,
    /// `None` when the radio returned no value (e.g. after a set).
    pub response: Option<CommandResponse>,
}

impl LocalAtResponse {
    /// Body layout: frame id, command (2), status, value.
    pub(crate) fn decode(data: &[u8], registry: &CommandRegistry) -> Result<Self> {
        let mut fields = Fields::new(data);
        let frame_id = FrameId(fields.u8("frame id")?);
        let command = command(fields.command()?)?;
        let status = CommandStatus::local(fields.u8("status")?)?;
        let response =
            registry.decode_command(FrameType::AtCommandResponse, command, fields.rest())?;
        Ok(Self {
            frame_id,
            command,
            status,
            response,
        })
    }
}

/// Response to a remote AT command (0x97).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteAtResponse {
    pub frame_id: FrameId,
    pub source64: Address64,
    pub source16: Address16,
    pub command: AtCommand,
    pub status: CommandStatus,
    /// `None` when the command was a set rather than a query.
    pub response: Option<CommandResponse>,
}

impl RemoteAtResponse {
    /// Body layout: frame id, source address (8 + 2), command (2), status, value.
    pub(crate) fn decode(data: &[u8], registry: &CommandRegistry) -> Result<Self> {
        let mut fields = Fields::new(data);
        let frame_id = FrameId(fields.u8("frame id")?);
        let source64 = fields.address64("source address")?;
        let source16 = fields.address16("source network address")?;
        let command = command(fields.command()?)?;
        let status = CommandStatus::remote(fields.u8("status")?)?;
        let response =
            registry.decode_command(FrameType::RemoteAtCommandResponse, command, fields.rest())?;
        Ok(Self {
            frame_id,
            source64,
            source16,
            command,
            status,
            response,
        })
    }
}

fn command(code: [u8; 2]) -> Result<AtCommand> {
    AtCommand::from_code(code).ok_or(DecodeError::UnknownCommand(code))
}
