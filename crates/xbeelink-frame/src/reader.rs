use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;
use xbeelink_transport::XbeeStream;

use crate::codec::{decode_frame, eof_error, skip_to_start, FrameConfig, RawFrame};
use crate::error::{FrameError, Result};

const READ_CHUNK: usize = 256;

/// Pulls verified frames off a byte stream.
///
/// Bytes ahead of a start marker are dropped and counted. A read timeout
/// surfaces as an `Io` error for which [`FrameError::is_timeout`] holds; the
/// partial frame stays buffered and the next call resumes it.
pub struct FrameReader<T> {
    inner: T,
    pending: BytesMut,
    max_frame_len: usize,
    skipped: u64,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            pending: BytesMut::with_capacity(4 * READ_CHUNK),
            max_frame_len: config.max_frame_len,
            skipped: 0,
        }
    }

    /// Block until the next complete frame.
    ///
    /// A checksum mismatch, empty frame or oversize frame is reported once
    /// and the bad frame is dropped, so calling again picks up the next one.
    /// EOF yields `ConnectionClosed` between frames and `Truncated` or
    /// `TruncatedEscape` inside one.
    pub fn read_frame(&mut self) -> Result<RawFrame> {
        loop {
            self.skipped += skip_to_start(&mut self.pending) as u64;
            if let Some(frame) = decode_frame(&mut self.pending, self.max_frame_len)? {
                trace!(frame_type = frame.frame_type, len = frame.len(), "frame read");
                return Ok(frame);
            }

            if self.fill()? == 0 {
                let err = eof_error(&self.pending);
                self.pending.clear();
                return Err(err);
            }
        }
    }

    /// One read into the pending buffer. Zero means EOF.
    fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Bytes discarded so far while hunting for a start marker.
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped
    }

    /// Bytes held from an incomplete frame.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }
}

impl FrameReader<XbeeStream> {
    /// Apply the configured read timeout to the stream, then wrap it.
    pub fn with_config_stream(inner: XbeeStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
