//! `tokio_util::codec` adapter for the frame format.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::codec::{decode_frame, encode_frame, eof_error, RawFrame, MAX_FRAME_LEN};
use crate::error::FrameError;

/// Frame codec for use with `FramedRead`/`FramedWrite`.
///
/// Recoverable errors (bad checksum, empty frame) are logged and skipped so a
/// framed stream keeps going. Truncated trailing frames are reported at EOF.
#[derive(Debug, Clone)]
pub struct XbeeCodec {
    max_frame_len: usize,
    discarded: u64,
}

impl XbeeCodec {
    /// Creates a codec accepting frames up to the 16-bit length limit.
    pub fn new() -> Self {
        Self::with_max_frame_len(MAX_FRAME_LEN)
    }

    /// Creates a codec with a tighter frame length limit.
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len,
            discarded: 0,
        }
    }

    /// Number of frames dropped for recoverable errors so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl Default for XbeeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for XbeeCodec {
    type Item = RawFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match decode_frame(src, self.max_frame_len) {
                Ok(frame) => return Ok(frame),
                Err(err) if err.is_recoverable() => {
                    self.discarded += 1;
                    warn!(error = %err, "discarding frame");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None if buf.is_empty() => Ok(None),
            None => {
                let err = eof_error(buf);
                buf.clear();
                match err {
                    FrameError::ConnectionClosed => Ok(None),
                    err => Err(err),
                }
            }
        }
    }
}

impl Encoder<RawFrame> for XbeeCodec {
    type Error = FrameError;

    fn encode(&mut self, item: RawFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(item.frame_type, &item.data, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;

    const HV_RESPONSE: [u8; 11] = [
        0x7E, 0x00, 0x07, 0x88, 0x01, 0x48, 0x56, 0x00, 0x1A, 0x46, 0x78,
    ];

    #[test]
    fn test_decode_skips_bad_checksum() {
        let mut corrupt = HV_RESPONSE;
        corrupt[10] = 0x00;
        let mut buf = BytesMut::from(&corrupt[..]);
        buf.extend_from_slice(&HV_RESPONSE);

        let mut codec = XbeeCodec::new();
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.frame_type, 0x88);
        assert_eq!(codec.discarded(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_reports_truncation() {
        let mut buf = BytesMut::from(&HV_RESPONSE[..5]);
        let mut codec = XbeeCodec::new();
        assert!(codec.decode(&mut buf).unwrap().is_none());

        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Truncated {
                offset: 2,
                expected: 7
            }
        ));
    }

    #[test]
    fn test_decode_eof_ignores_trailing_noise() {
        let mut buf = BytesMut::from(&[0x00, 0x01][..]);
        let mut codec = XbeeCodec::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_framed_roundtrip() {
        let (client, server) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(client, XbeeCodec::new());
        let mut stream = FramedRead::new(server, XbeeCodec::new());

        sink.send(RawFrame::new(0x08, vec![0x01, b'N', b'D']))
            .await
            .unwrap();
        sink.send(RawFrame::new(0x90, vec![0x7E, 0x13]))
            .await
            .unwrap();
        drop(sink);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.data.as_ref(), &[0x01, b'N', b'D']);
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.data.as_ref(), &[0x7E, 0x13]);
        assert!(stream.next().await.is_none());
    }
}
