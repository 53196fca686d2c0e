use std::io::{self, ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;
use xbeelink_transport::XbeeStream;

use crate::codec::{encode_frame, FrameConfig, RawFrame, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Encodes frames and puts each one on the wire whole.
///
/// The stuffed frame is assembled in a scratch buffer before any byte is
/// written, so a writer shared behind a lock never interleaves two frames.
pub struct FrameWriter<T> {
    inner: T,
    scratch: BytesMut,
    max_frame_len: usize,
    frames_written: u64,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            scratch: BytesMut::with_capacity(HEADER_SIZE + 64),
            max_frame_len: config.max_frame_len,
            frames_written: 0,
        }
    }

    pub fn write_frame(&mut self, frame: &RawFrame) -> Result<()> {
        self.send(frame.frame_type, frame.data.as_ref())
    }

    /// Stuff and checksum `data` under `frame_type`, write it, then flush.
    ///
    /// A frame over the configured maximum is rejected before anything is
    /// written.
    pub fn send(&mut self, frame_type: u8, data: &[u8]) -> Result<()> {
        let len = data.len() + 1;
        if len > self.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                size: len,
                max: self.max_frame_len,
            });
        }

        self.scratch.clear();
        encode_frame(frame_type, data, &mut self.scratch)?;
        write_fully(&mut self.inner, &self.scratch)?;

        self.frames_written += 1;
        trace!(frame_type, len, wire_len = self.scratch.len(), "frame written");
        Ok(())
    }

    /// Frames written since this writer was created.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// The stream underneath, for writing bytes outside the framing.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl FrameWriter<XbeeStream> {
    /// Apply the configured write timeout to the stream, then wrap it.
    pub fn with_config_stream(inner: XbeeStream, config: FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

/// `write_all` followed by `flush`. `Interrupted` and `WouldBlock` are
/// retried; a zero-length write means the link is gone.
fn write_fully<W: Write>(dst: &mut W, mut bytes: &[u8]) -> Result<()> {
    while !bytes.is_empty() {
        match dst.write(bytes) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => bytes = &bytes[n..],
            Err(err) if retryable(&err) => {}
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    loop {
        match dst.flush() {
            Ok(()) => return Ok(()),
            Err(err) if retryable(&err) => {}
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

fn retryable(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock)
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::{decode_frame, MAX_FRAME_LEN};

    /// Records every `write` call and `flush` separately.
    #[derive(Default)]
    struct Serial {
        writes: Vec<Vec<u8>>,
        flushes: usize,
        max_chunk: Option<usize>,
        errors: Vec<ErrorKind>,
    }

    impl Serial {
        fn wire(&self) -> Vec<u8> {
            self.writes.concat()
        }
    }

    impl Write for Serial {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(kind) = self.errors.pop() {
                return Err(io::Error::from(kind));
            }
            let n = self.max_chunk.map_or(buf.len(), |max| buf.len().min(max));
            self.writes.push(buf[..n].to_vec());
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn node_discover_request_on_the_wire() {
        let mut writer = FrameWriter::new(Serial::default());
        writer.send(0x08, &[0x01, b'N', b'D']).unwrap();

        let serial = writer.get_mut();
        assert_eq!(serial.wire(), [0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64]);
        assert_eq!(serial.writes.len(), 1);
        assert_eq!(serial.flushes, 1);
    }

    #[test]
    fn reserved_bytes_are_stuffed_but_not_counted() {
        let mut writer = FrameWriter::new(Serial::default());
        writer.send(0x10, &[0x7E, 0x11]).unwrap();

        // Length 3 covers type plus two logical body bytes.
        assert_eq!(
            writer.get_mut().wire(),
            [0x7E, 0x00, 0x03, 0x10, 0x7D, 0x5E, 0x7D, 0x31, 0x60]
        );
    }

    #[test]
    fn written_frame_decodes_back() {
        let frame = RawFrame::new(0x17, vec![0x03, 0, 0x13, 0xA2, 0, 0x40, 0x55, 0x73, 0x0D]);
        let mut writer = FrameWriter::new(Serial::default());
        writer.write_frame(&frame).unwrap();
        writer.send(0x08, &[0x04, b'A', b'I']).unwrap();
        assert_eq!(writer.frames_written(), 2);

        let mut wire = BytesMut::from(writer.get_mut().wire().as_slice());
        assert_eq!(decode_frame(&mut wire, MAX_FRAME_LEN).unwrap(), Some(frame));
        let second = decode_frame(&mut wire, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(&second.data[1..], b"AI");
        assert!(wire.is_empty());
    }

    #[test]
    fn oversize_frame_is_never_written() {
        let config = FrameConfig {
            max_frame_len: 4,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Serial::default(), config);

        let err = writer.send(0x10, b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 10, max: 4 }));
        assert!(err.is_recoverable());
        assert!(writer.get_mut().writes.is_empty());
        assert_eq!(writer.frames_written(), 0);
    }

    #[test]
    fn short_writes_and_transient_errors_are_retried() {
        let serial = Serial {
            max_chunk: Some(3),
            errors: vec![ErrorKind::WouldBlock, ErrorKind::Interrupted],
            ..Serial::default()
        };
        let mut writer = FrameWriter::new(serial);
        writer.send(0x08, &[0x01, b'D', b'0']).unwrap();

        let serial = writer.get_mut();
        assert_eq!(serial.wire().len(), 8);
        assert_eq!(serial.writes.len(), 3);
    }

    #[test]
    fn hard_error_is_reported() {
        let serial = Serial {
            errors: vec![ErrorKind::BrokenPipe],
            ..Serial::default()
        };
        let mut writer = FrameWriter::new(serial);
        let err = writer.send(0x08, &[0x01, b'V', b'R']).unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn zero_length_write_means_closed() {
        struct Gone;
        impl Write for Gone {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = FrameWriter::new(Gone).send(0x08, &[0x01, b'V', b'R']).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    #[cfg(unix)]
    fn stream_gets_write_timeout() {
        let (left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        let config = FrameConfig {
            write_timeout: Some(std::time::Duration::from_millis(10)),
            ..FrameConfig::default()
        };
        assert!(FrameWriter::with_config_stream(XbeeStream::from_unix(left), config).is_ok());
    }
}
