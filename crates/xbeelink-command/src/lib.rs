//! AT command catalog, typed responses and request encoding.
//!
//! Sits on top of the frame codec: a verified [`RawFrame`] goes in, a typed
//! [`ResponseFrame`] comes out. The [`CommandRegistry`] decides which decoder
//! handles the payload of each AT command, and [`Request`] builds the
//! outbound frames. [`FrameIdAllocator`] hands out correlation IDs.
//!
//! [`RawFrame`]: xbeelink_frame::RawFrame

pub mod address;
pub mod command;
pub mod error;
pub mod frame_id;
pub mod hardware;
pub mod registry;
pub mod request;
pub mod response;
pub mod status;

mod fields;

pub use address::{Address16, Address64, ParseAddressError};
pub use command::{AtCommand, UnknownCommand};
pub use error::{DecodeError, EncodeError};
pub use frame_id::{FrameId, FrameIdAllocator};
pub use hardware::{HardwareVersion, RadioType};
pub use registry::{CommandRegistry, Decoder};
pub use request::{value_from_u32, AtRequest, RemoteAtRequest, Request, TransmitRequest};
pub use response::{
    AnalogSample, CommandResponse, IoSample, LocalAtResponse, NodeDiscovery, NodeIdentification,
    ReceivePacket, RemoteAtResponse, ResponseFrame, TransmitStatus,
};
pub use status::{CommandStatus, DeviceType, ModemStatus};
