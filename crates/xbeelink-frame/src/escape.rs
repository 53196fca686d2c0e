//! Byte stuffing (API mode 2 escaping).
//!
//! Four byte values are reserved on the wire. Inside a frame each of them is
//! replaced by [`ESCAPE`] followed by the value XOR [`ESCAPE_XOR`].

use bytes::BufMut;

use crate::error::{FrameError, Result};

/// Frame start delimiter.
pub const START: u8 = 0x7E;

/// Escape marker.
pub const ESCAPE: u8 = 0x7D;

/// Software flow control: resume.
pub const XON: u8 = 0x11;

/// Software flow control: pause.
pub const XOFF: u8 = 0x13;

/// Mask applied to an escaped byte.
pub const ESCAPE_XOR: u8 = 0x20;

/// Returns true if `byte` must be escaped inside a frame.
pub fn is_special(byte: u8) -> bool {
    matches!(byte, START | ESCAPE | XON | XOFF)
}

/// Write one logical byte, stuffed if needed.
pub fn escape_byte(byte: u8, dst: &mut impl BufMut) {
    if is_special(byte) {
        dst.put_u8(ESCAPE);
        dst.put_u8(byte ^ ESCAPE_XOR);
    } else {
        dst.put_u8(byte);
    }
}

/// Stuff a run of logical bytes into `dst`.
pub fn escape(src: &[u8], dst: &mut impl BufMut) {
    for &byte in src {
        escape_byte(byte, dst);
    }
}

/// Number of wire bytes `src` occupies once stuffed.
pub fn escaped_len(src: &[u8]) -> usize {
    src.len() + src.iter().filter(|&&b| is_special(b)).count()
}

/// Undo one escape pair. `next` is the byte that followed [`ESCAPE`].
pub fn unescape_byte(next: u8) -> u8 {
    next ^ ESCAPE_XOR
}

/// Remove byte stuffing from a complete run of wire bytes.
///
/// Fails with [`FrameError::TruncatedEscape`] if the input ends on a lone
/// escape marker. The reported offset counts logical bytes.
pub fn unescape(src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(src.len());
    let mut iter = src.iter().copied();
    while let Some(byte) = iter.next() {
        if byte == ESCAPE {
            match iter.next() {
                Some(next) => out.push(unescape_byte(next)),
                None => return Err(FrameError::TruncatedEscape { offset: out.len() }),
            }
        } else {
            out.push(byte);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn test_special_bytes() {
        for byte in [START, ESCAPE, XON, XOFF] {
            assert!(is_special(byte), "0x{byte:02X} should be special");
        }
        assert!(!is_special(0x00));
        assert!(!is_special(0x20));
        assert!(!is_special(0xFF));
    }

    #[test]
    fn test_escape_reserved_values() {
        let mut buf = BytesMut::new();
        escape(&[0x7E, 0x7D, 0x11, 0x13], &mut buf);
        assert_eq!(
            buf.as_ref(),
            &[0x7D, 0x5E, 0x7D, 0x5D, 0x7D, 0x31, 0x7D, 0x33]
        );
    }

    #[test]
    fn test_escape_leaves_plain_bytes() {
        let mut buf = BytesMut::new();
        escape(&[0x00, 0x13, 0xA2, 0x00], &mut buf);
        assert_eq!(buf.as_ref(), &[0x00, 0x7D, 0x33, 0xA2, 0x00]);
        assert_eq!(escaped_len(&[0x00, 0x13, 0xA2, 0x00]), 5);
    }

    #[test]
    fn test_unescape_restores_stuffed_run() {
        let logical = [0x01, 0x7E, 0x02, 0x7D, 0x11, 0x13, 0xFF];
        let mut wire = BytesMut::new();
        escape(&logical, &mut wire);
        assert_eq!(unescape(&wire).unwrap(), logical);
    }

    #[test]
    fn test_unescape_trailing_escape() {
        let err = unescape(&[0x01, 0x02, ESCAPE]).unwrap_err();
        assert!(matches!(err, FrameError::TruncatedEscape { offset: 2 }));
    }
}
