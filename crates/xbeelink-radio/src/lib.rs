//! Request/response correlation for an XBee radio link.
//!
//! A [`Radio`] owns one duplex stream. A single reader thread turns the
//! inbound bytes into typed frames and hands each one, in arrival order, to
//! the synchronous waiter expecting its frame ID, the bounded backlog, every
//! channel subscriber and every callback listener.

pub mod backlog;
pub mod config;
pub mod error;
pub mod radio;
pub mod stats;

pub use backlog::Backlog;
pub use config::{FrameFilter, RadioConfig, DEFAULT_BACKLOG_CAPACITY, DEFAULT_TIMEOUT};
pub use error::{RadioError, Result};
pub use radio::{LinkState, ListenerId, Radio};
pub use stats::LinkStats;
