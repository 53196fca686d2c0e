//! Frame IDs and their allocator.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// One-byte correlation tag carried by requests and echoed by responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FrameId(pub u8);

impl FrameId {
    /// The radio sends no response for this ID.
    pub const NO_RESPONSE: FrameId = FrameId(0);

    /// Fallback ID for hand-built requests. Never handed out by the allocator.
    pub const DEFAULT: FrameId = FrameId(1);

    /// First ID the allocator hands out.
    pub const FIRST: FrameId = FrameId(2);

    /// Whether a response carrying this ID will be sent.
    pub fn expects_response(self) -> bool {
        self != Self::NO_RESPONSE
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Round-robin frame ID source.
///
/// Cycles 2, 3, ..., 255, 2, ... so it never returns [`FrameId::NO_RESPONSE`]
/// or [`FrameId::DEFAULT`]. Safe to share between threads; each call
/// returns the next ID exactly once.
#[derive(Debug)]
pub struct FrameIdAllocator {
    last: AtomicU8,
}

impl FrameIdAllocator {
    pub fn new() -> Self {
        Self {
            last: AtomicU8::new(u8::MAX),
        }
    }

    /// Allocate the next ID.
    pub fn next(&self) -> FrameId {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = step(prev);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return FrameId(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for FrameIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

fn step(prev: u8) -> u8 {
    if prev < FrameId::FIRST.0 || prev == u8::MAX {
        FrameId::FIRST.0
    } else {
        prev + 1
    }
}
