//! Primitive readers and writers for the binary formats.
//!
//! All integers are big-endian. Strings and lists carry a `u32` length prefix.

use bytes::{Buf, BufMut, BytesMut};

use crate::utils::CodecError;

pub(crate) fn put_str(buf: &mut BytesMut, value: &str) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

pub(crate) fn put_str_list(buf: &mut BytesMut, values: &[String]) {
    buf.put_u32(values.len() as u32);
    for value in values {
        put_str(buf, value);
    }
}

pub(crate) fn put_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(u8::from(value));
}

/// Cursor over an input slice that reports truncation instead of panicking.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, len: usize, what: &'static str) -> Result<(), CodecError> {
        if self.buf.remaining() < len {
            return Err(CodecError::Truncated(what));
        }
        Ok(())
    }

    pub(crate) fn magic(&mut self, expected: [u8; 4]) -> Result<(), CodecError> {
        self.ensure(4, "magic")?;
        let mut found = [0u8; 4];
        self.buf.copy_to_slice(&mut found);
        if found != expected {
            return Err(CodecError::BadMagic { expected, found });
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> Result<u8, CodecError> {
        self.ensure(1, what)?;
        Ok(self.buf.get_u8())
    }

    pub(crate) fn u16(&mut self, what: &'static str) -> Result<u16, CodecError> {
        self.ensure(2, what)?;
        Ok(self.buf.get_u16())
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> Result<u32, CodecError> {
        self.ensure(4, what)?;
        Ok(self.buf.get_u32())
    }

    pub(crate) fn u64(&mut self, what: &'static str) -> Result<u64, CodecError> {
        self.ensure(8, what)?;
        Ok(self.buf.get_u64())
    }

    pub(crate) fn i64(&mut self, what: &'static str) -> Result<i64, CodecError> {
        self.ensure(8, what)?;
        Ok(self.buf.get_i64())
    }

    pub(crate) fn bool(&mut self, what: &'static str) -> Result<bool, CodecError> {
        match self.u8(what)? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(CodecError::UnknownTag { field: what, tag }),
        }
    }

    pub(crate) fn bytes(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], CodecError> {
        self.ensure(len, what)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    pub(crate) fn string(&mut self, what: &'static str) -> Result<String, CodecError> {
        let len = self.u32(what)? as usize;
        let raw = self.bytes(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8(what))
    }

    pub(crate) fn string_list(&mut self, what: &'static str) -> Result<Vec<String>, CodecError> {
        let count = self.u32(what)? as usize;
        // Each entry needs at least its length prefix
        self.ensure(count.saturating_mul(4), what)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.string(what)?);
        }
        Ok(values)
    }

    pub(crate) fn finish(self) -> Result<(), CodecError> {
        match self.buf.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}
