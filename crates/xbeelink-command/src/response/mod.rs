//! Typed inbound frames.

pub mod at;
pub mod command;
pub mod io_sample;
pub mod packet;

use serde::{Serialize, Serializer};
use xbeelink_frame::{FrameType, RawFrame};

use crate::error::DecodeError;
use crate::frame_id::FrameId;
use crate::status::ModemStatus;

pub use at::{LocalAtResponse, RemoteAtResponse};
pub use command::{CommandResponse, NodeDiscovery};
pub use io_sample::{AnalogSample, IoSample};
pub use packet::{NodeIdentification, ReceivePacket, TransmitStatus};

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum ResponseFrame {
    /// Local AT command response (0x88).
    LocalAt(LocalAtResponse),
    /// Remote AT command response (0x97).
    RemoteAt(RemoteAtResponse),
    /// Modem status (0x8A).
    ModemStatus { status: ModemStatus },
    /// Transmit status (0x8B).
    TransmitStatus(TransmitStatus),
    /// Receive packet (0x90).
    Receive(ReceivePacket),
    /// IO data sample indicator (0x92).
    IoSample(IoSample),
    /// Node identification indicator (0x95).
    NodeIdentification(NodeIdentification),
    /// A verified frame that could not be decoded. Delivered anyway so the
    /// stream stays in step and observers can see what arrived.
    Undecoded {
        frame_type: u8,
        data: Vec<u8>,
        #[serde(serialize_with = "display")]
        error: DecodeError,
    },
}

impl ResponseFrame {
    /// Wrap a frame that failed to decode.
    pub fn undecoded(frame: &RawFrame, error: DecodeError) -> Self {
        ResponseFrame::Undecoded {
            frame_type: frame.frame_type,
            data: frame.data.to_vec(),
            error,
        }
    }

    /// The frame type byte this response arrived under.
    pub fn frame_type(&self) -> u8 {
        let known = match self {
            ResponseFrame::LocalAt(_) => FrameType::AtCommandResponse,
            ResponseFrame::RemoteAt(_) => FrameType::RemoteAtCommandResponse,
            ResponseFrame::ModemStatus { .. } => FrameType::ModemStatus,
            ResponseFrame::TransmitStatus(_) => FrameType::TransmitStatus,
            ResponseFrame::Receive(_) => FrameType::ReceivePacket,
            ResponseFrame::IoSample(_) => FrameType::IoSampleIndicator,
            ResponseFrame::NodeIdentification(_) => FrameType::NodeIdentification,
            ResponseFrame::Undecoded { frame_type, .. } => return *frame_type,
        };
        known.code()
    }

    /// The frame ID, for frame types that carry one.
    ///
    /// Undecoded frames of a known frame-ID-carrying type still report their
    /// ID, so a caller waiting on it is released rather than timing out.
    pub fn frame_id(&self) -> Option<FrameId> {
        match self {
            ResponseFrame::LocalAt(r) => Some(r.frame_id),
            ResponseFrame::RemoteAt(r) => Some(r.frame_id),
            ResponseFrame::TransmitStatus(r) => Some(r.frame_id),
            ResponseFrame::Undecoded {
                frame_type, data, ..
            } => match (FrameType::from_code(*frame_type), data.first()) {
                (Some(ft), Some(&id)) if ft.has_frame_id() => Some(FrameId(id)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_undecoded(&self) -> bool {
        matches!(self, ResponseFrame::Undecoded { .. })
    }
}

fn display<S: Serializer>(error: &DecodeError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
