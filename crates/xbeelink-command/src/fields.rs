use bytes::Buf;

use crate::address::{Address16, Address64};
use crate::error::{DecodeError, Result};

/// Bounds-checked field reader over a frame body.
pub(crate) struct Fields<'a> {
    buf: &'a [u8],
}

impl<'a> Fields<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn need(&self, what: &'static str, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(DecodeError::Truncated {
                what,
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> Result<u8> {
        self.need(what, 1)?;
        Ok(self.buf.get_u8())
    }

    pub(crate) fn u16(&mut self, what: &'static str) -> Result<u16> {
        self.need(what, 2)?;
        Ok(self.buf.get_u16())
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> Result<u32> {
        self.need(what, 4)?;
        Ok(self.buf.get_u32())
    }

    pub(crate) fn u64(&mut self, what: &'static str) -> Result<u64> {
        self.need(what, 8)?;
        Ok(self.buf.get_u64())
    }

    pub(crate) fn address64(&mut self, what: &'static str) -> Result<Address64> {
        self.u64(what).map(Address64)
    }

    pub(crate) fn address16(&mut self, what: &'static str) -> Result<Address16> {
        self.u16(what).map(Address16)
    }

    pub(crate) fn command(&mut self) -> Result<[u8; 2]> {
        self.need("command", 2)?;
        let code = [self.buf[0], self.buf[1]];
        self.buf.advance(2);
        Ok(code)
    }

    /// Bytes up to the next NUL; the NUL is consumed but not returned.
    pub(crate) fn c_str(&mut self) -> Result<&'a [u8]> {
        let end = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::UnterminatedIdentifier)?;
        let (text, rest) = self.buf.split_at(end);
        self.buf = &rest[1..];
        Ok(text)
    }

    /// Everything not yet read.
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.buf)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
