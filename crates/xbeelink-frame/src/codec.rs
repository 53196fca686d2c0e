use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::checksum::{checksum, verify};
use crate::error::{FrameError, Result};
use crate::escape::{escape, escape_byte, escaped_len, unescape_byte, ESCAPE, START};
use crate::frame_type::FrameType;

/// Start marker (1) + length (2) = 3 bytes, never escaped.
pub const HEADER_SIZE: usize = 3;

/// Largest logical frame length the 16-bit length field can carry.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// A verified frame: its type byte and the logical body after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// The frame type code. May be a code this crate does not know.
    pub frame_type: u8,
    /// The unescaped body, excluding type byte and checksum.
    pub data: Bytes,
}

impl RawFrame {
    /// Create a new frame.
    pub fn new(frame_type: u8, data: impl Into<Bytes>) -> Self {
        Self {
            frame_type,
            data: data.into(),
        }
    }

    /// The frame type, if it is a known one.
    pub fn kind(&self) -> Option<FrameType> {
        FrameType::from_code(self.frame_type)
    }

    /// Value of the length field: type byte plus body.
    pub fn len(&self) -> usize {
        1 + self.data.len()
    }

    /// Always false; a frame carries at least its type byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Checksum over the type byte and body.
    pub fn checksum(&self) -> u8 {
        // checksum(data) == 0xFF - sum(data); fold the type byte in.
        checksum(&self.data).wrapping_sub(self.frame_type)
    }

    /// The total wire size of this frame, stuffing included.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE
            + escaped_len(&[self.frame_type])
            + escaped_len(&self.data)
            + escaped_len(&[self.checksum()])
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────┬──────────────┬──────────┬───────────────┬──────────┐
/// │ 0x7E  │ Length       │ Type     │ Body          │ Checksum │
/// │       │ (2B BE)      │ (1B)     │ (Length-1 B)  │ (1B)     │
/// └───────┴──────────────┴──────────┴───────────────┴──────────┘
///            raw          └────────── byte-stuffed ────────────┘
/// ```
pub fn encode_frame(frame_type: u8, data: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = data.len() + 1;
    if length > MAX_FRAME_LEN {
        return Err(FrameError::FrameTooLarge {
            size: length,
            max: MAX_FRAME_LEN,
        });
    }
    let cs = checksum(data).wrapping_sub(frame_type);

    dst.reserve(HEADER_SIZE + 2 * (length + 1));
    dst.put_u8(START);
    dst.put_u16(length as u16);
    escape_byte(frame_type, dst);
    escape(data, dst);
    escape_byte(cs, dst);
    Ok(())
}

/// Discard bytes up to the next start marker. Returns how many were dropped.
pub fn skip_to_start(src: &mut BytesMut) -> usize {
    let skipped = src
        .iter()
        .position(|&b| b == START)
        .unwrap_or(src.len());
    if skipped > 0 {
        src.advance(skipped);
        debug!(skipped, "discarded bytes while seeking frame start");
    }
    skipped
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. Bytes ahead of the
/// start marker are discarded.
///
/// A frame that fails its checksum is consumed and reported as
/// [`FrameError::ChecksumMismatch`]; the next call picks up at the following
/// start marker.
pub fn decode_frame(src: &mut BytesMut, max_frame_len: usize) -> Result<Option<RawFrame>> {
    skip_to_start(src);
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let length = u16::from_be_bytes([src[1], src[2]]) as usize;
    if length == 0 {
        src.advance(HEADER_SIZE);
        return Err(FrameError::EmptyFrame);
    }
    if length > max_frame_len {
        // Drop the marker only; the length may have been noise.
        src.advance(1);
        return Err(FrameError::FrameTooLarge {
            size: length,
            max: max_frame_len,
        });
    }

    // Type + body + checksum, unescaped.
    let mut logical = Vec::with_capacity(length + 1);
    let mut pos = HEADER_SIZE;
    while logical.len() <= length {
        let Some(&byte) = src.get(pos) else {
            return Ok(None);
        };
        if byte == ESCAPE {
            let Some(&next) = src.get(pos + 1) else {
                return Ok(None);
            };
            logical.push(unescape_byte(next));
            pos += 2;
        } else {
            logical.push(byte);
            pos += 1;
        }
    }
    src.advance(pos);

    let received = logical[length];
    let body = &logical[..length];
    if !verify(body, received) {
        return Err(FrameError::ChecksumMismatch {
            expected: checksum(body),
            actual: received,
        });
    }

    Ok(Some(RawFrame {
        frame_type: body[0],
        data: Bytes::copy_from_slice(&body[1..]),
    }))
}

/// Classify leftover bytes when the stream ends before a frame completes.
///
/// `expected` is 0 when the stream ended inside the length field.
pub fn eof_error(src: &[u8]) -> FrameError {
    let Some(start) = src.iter().position(|&b| b == START) else {
        return FrameError::ConnectionClosed;
    };
    let src = &src[start..];
    if src.len() < HEADER_SIZE {
        return FrameError::Truncated {
            offset: 0,
            expected: 0,
        };
    }

    let expected = u16::from_be_bytes([src[1], src[2]]) as usize;
    let mut offset = 0usize;
    let mut pos = HEADER_SIZE;
    while pos < src.len() {
        if src[pos] == ESCAPE {
            if pos + 1 >= src.len() {
                return FrameError::TruncatedEscape { offset };
            }
            pos += 2;
        } else {
            pos += 1;
        }
        offset += 1;
    }
    FrameError::Truncated {
        offset: offset.min(expected),
        expected,
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum logical frame length. Default: 0xFFFF.
    pub max_frame_len: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_LEN,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HV_RESPONSE: [u8; 11] = [
        0x7E, 0x00, 0x07, 0x88, 0x01, 0x48, 0x56, 0x00, 0x1A, 0x46, 0x78,
    ];

    const REMOTE_D0_REQUEST: [u8; 20] = [
        0x7E, 0x00, 0x0F, 0x17, 0x01, 0x00, 0x7D, 0x33, 0xA2, 0x00, 0x40, 0x62, 0xAC, 0x98, 0xFF,
        0xFE, 0x02, 0x44, 0x30, 0xD9,
    ];

    const ND_RESPONSE_ESCAPED: [u8; 39] = [
        0x7E, 0x00, 0x22, 0x88, 0x01, 0x4E, 0x44, 0x00, 0xAE, 0x38, 0x00, 0x13, 0xA2, 0x00, 0x40,
        0x2D, 0x03, 0x0D, 0x48, 0x56, 0x41, 0x43, 0x2D, 0x54, 0x52, 0x41, 0x4E, 0x45, 0x00, 0xFF,
        0xFE, 0x01, 0x00, 0xC1, 0x05, 0x10, 0x1E, 0x7D, 0x31,
    ];

    #[test]
    fn test_decode_local_at_response() {
        let mut buf = BytesMut::from(&HV_RESPONSE[..]);
        let frame = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();

        assert_eq!(frame.frame_type, 0x88);
        assert_eq!(frame.kind(), Some(FrameType::AtCommandResponse));
        assert_eq!(frame.data.as_ref(), &[0x01, 0x48, 0x56, 0x00, 0x1A, 0x46]);
        assert_eq!(frame.len(), 7);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_remote_at_request_escapes_address() {
        let data = [
            0x01, 0x00, 0x13, 0xA2, 0x00, 0x40, 0x62, 0xAC, 0x98, 0xFF, 0xFE, 0x02, 0x44, 0x30,
        ];
        let mut buf = BytesMut::new();
        encode_frame(0x17, &data, &mut buf).unwrap();

        assert_eq!(buf.as_ref(), &REMOTE_D0_REQUEST);
        assert_eq!(RawFrame::new(0x17, data.to_vec()).wire_size(), buf.len());
    }

    #[test]
    fn test_encoder_output_verifies() {
        let frame = RawFrame::new(0x08, vec![0x01, 0x4E, 0x4A]);
        let mut buf = BytesMut::new();
        encode_frame(frame.frame_type, &frame.data, &mut buf).unwrap();

        assert_eq!(buf.as_ref(), &[0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x4A, 0x5E]);
        let decoded = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_decode_escaped_checksum() {
        let mut buf = BytesMut::from(&ND_RESPONSE_ESCAPED[..]);
        let frame = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();

        assert_eq!(frame.frame_type, 0x88);
        assert_eq!(frame.len(), 0x22);
        assert_eq!(&frame.data[1..3], b"ND");
        assert_eq!(frame.checksum(), 0x11);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0x7E, 0x00][..]);
        assert!(decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_decode_incomplete_body() {
        let mut buf = BytesMut::from(&HV_RESPONSE[..8]);
        assert!(decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().is_none());

        buf.extend_from_slice(&HV_RESPONSE[8..]);
        let frame = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(frame.frame_type, 0x88);
    }

    #[test]
    fn test_decode_split_inside_escape_pair() {
        // Cut right after the 0x7D that escapes the 0x13 in the address.
        let mut buf = BytesMut::from(&REMOTE_D0_REQUEST[..7]);
        assert!(decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().is_none());

        buf.extend_from_slice(&REMOTE_D0_REQUEST[7..]);
        let frame = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(frame.frame_type, 0x17);
        assert_eq!(frame.data[2], 0x13);
    }

    #[test]
    fn test_leading_garbage_is_skipped() {
        let mut buf = BytesMut::from(&[0x00, 0x42, 0xFF][..]);
        buf.extend_from_slice(&HV_RESPONSE);

        let frame = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(frame.frame_type, 0x88);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_skip_to_start_counts() {
        let mut buf = BytesMut::from(&[0x01, 0x02, 0x7E, 0x00][..]);
        assert_eq!(skip_to_start(&mut buf), 2);
        assert_eq!(buf.as_ref(), &[0x7E, 0x00]);

        let mut junk = BytesMut::from(&[0x01, 0x02][..]);
        assert_eq!(skip_to_start(&mut junk), 2);
        assert!(junk.is_empty());
    }

    #[test]
    fn test_checksum_mismatch_consumes_frame_and_resyncs() {
        let mut corrupt = HV_RESPONSE;
        corrupt[10] = 0x79;
        let mut buf = BytesMut::from(&corrupt[..]);
        buf.extend_from_slice(&HV_RESPONSE);

        let err = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ChecksumMismatch {
                expected: 0x78,
                actual: 0x79
            }
        ));
        assert!(err.is_recoverable());

        let frame = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(frame.data.as_ref(), &[0x01, 0x48, 0x56, 0x00, 0x1A, 0x46]);
    }

    #[test]
    fn test_corrupted_body_byte_fails() {
        let mut corrupt = HV_RESPONSE;
        corrupt[8] ^= 0x01;
        let mut buf = BytesMut::from(&corrupt[..]);
        let err = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap_err();
        assert!(matches!(err, FrameError::ChecksumMismatch { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_frame_is_recoverable() {
        let mut buf = BytesMut::from(&[0x7E, 0x00, 0x00][..]);
        buf.extend_from_slice(&HV_RESPONSE);

        let err = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap_err();
        assert!(matches!(err, FrameError::EmptyFrame));
        assert!(err.is_recoverable());
        assert!(decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().is_some());
    }

    #[test]
    fn test_frame_too_large_drops_marker() {
        let mut buf = BytesMut::from(&HV_RESPONSE[..]);
        let err = decode_frame(&mut buf, 4).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 7, max: 4 }));
        assert_eq!(buf.len(), HV_RESPONSE.len() - 1);
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(0x08, &[0x01, b'N', b'J', 0xFF], &mut buf).unwrap();
        encode_frame(0x08, &[0x02, b'N', b'D'], &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        let f2 = decode_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(f1.data.as_ref(), &[0x01, b'N', b'J', 0xFF]);
        assert_eq!(f2.data.as_ref(), &[0x02, b'N', b'D']);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_rejects_oversized_body() {
        let mut buf = BytesMut::new();
        let err = encode_frame(0x10, &vec![0u8; MAX_FRAME_LEN], &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_eof_error_classification() {
        assert!(matches!(eof_error(&[]), FrameError::ConnectionClosed));
        assert!(matches!(eof_error(&[0x01, 0x02]), FrameError::ConnectionClosed));
        assert!(matches!(
            eof_error(&[0x7E, 0x00]),
            FrameError::Truncated {
                offset: 0,
                expected: 0
            }
        ));
        assert!(matches!(
            eof_error(&HV_RESPONSE[..6]),
            FrameError::Truncated {
                offset: 3,
                expected: 7
            }
        ));
        assert!(matches!(
            eof_error(&REMOTE_D0_REQUEST[..7]),
            FrameError::TruncatedEscape { offset: 3 }
        ));
    }
}
