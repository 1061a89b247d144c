//! Binary reading and writing utilities for the sync buffer.
//!
//! All values are little-endian. Strings are UTF-8 with a `u16` byte-length
//! prefix. Quaternions are four `f32` in `x, y, z, w` order.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::Quat;

use crate::ProtocolError;

/// A reader for parsing sync buffers.
///
/// Every getter checks the remaining length first, so a truncated buffer
/// yields [`ProtocolError::UnexpectedEof`] instead of a panic.
#[derive(Debug)]
pub struct BinaryReader {
    buf: Bytes,
}

impl BinaryReader {
    /// Create a new reader from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// Returns remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn need(&self, n: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() >= n {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedEof)
        }
    }

    #[inline]
    pub fn get_u8(&mut self) -> Result<u8, ProtocolError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    /// Any non-zero byte reads as `true`.
    #[inline]
    pub fn get_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.get_u8()? != 0)
    }

    #[inline]
    pub fn get_u16(&mut self) -> Result<u16, ProtocolError> {
        self.need(2)?;
        Ok(self.buf.get_u16_le())
    }

    #[inline]
    pub fn get_u32(&mut self) -> Result<u32, ProtocolError> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    #[inline]
    pub fn get_i32(&mut self) -> Result<i32, ProtocolError> {
        self.need(4)?;
        Ok(self.buf.get_i32_le())
    }

    #[inline]
    pub fn get_f32(&mut self) -> Result<f32, ProtocolError> {
        self.need(4)?;
        Ok(self.buf.get_f32_le())
    }

    pub fn get_quat(&mut self) -> Result<Quat, ProtocolError> {
        let x = self.get_f32()?;
        let y = self.get_f32()?;
        let z = self.get_f32()?;
        let w = self.get_f32()?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn get_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.get_u16()? as usize;
        self.need(len)?;
        let bytes = self.buf.split_to(len);
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }
}

/// A writer for building sync buffers.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_bool(&mut self, v: bool) {
        self.buf.put_u8(v as u8);
    }

    #[inline]
    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    #[inline]
    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    pub fn put_quat(&mut self, q: Quat) {
        self.put_f32(q.x);
        self.put_f32(q.y);
        self.put_f32(q.z);
        self.put_f32(q.w);
    }

    /// Write a length-prefixed UTF-8 string, truncated at a char boundary to
    /// fit the `u16` prefix.
    pub fn put_string(&mut self, s: &str) {
        let mut end = s.len().min(u16::MAX as usize);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.put_u16_le(end as u16);
        self.buf.put_slice(&s.as_bytes()[..end]);
    }

    /// Consume the writer and return the built buffer.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Get current buffer as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_u32() {
        let mut w = BinaryWriter::new();
        w.put_u32(0xDEADBEEF);
        let data = w.finish();
        let mut r = BinaryReader::new(data);
        assert_eq!(r.get_u32().unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_string() {
        let mut w = BinaryWriter::new();
        w.put_string("Åsa");
        let data = w.finish();
        let mut r = BinaryReader::new(data);
        assert_eq!(r.get_string().unwrap(), "Åsa");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_is_error() {
        let mut r = BinaryReader::new(vec![0x01, 0x02]);
        assert!(matches!(r.get_u32(), Err(ProtocolError::UnexpectedEof)));
    }

    #[test]
    fn test_string_length_past_end() {
        let mut w = BinaryWriter::new();
        w.put_u16(40);
        w.put_u8(b'a');
        let mut r = BinaryReader::new(w.finish());
        assert!(matches!(r.get_string(), Err(ProtocolError::UnexpectedEof)));
    }

    #[test]
    fn test_quat_order() {
        let mut w = BinaryWriter::new();
        w.put_quat(Quat::from_xyzw(0.1, 0.2, 0.3, 0.9));
        assert_eq!(w.len(), 16);
        assert_eq!(&w.as_slice()[12..16], &0.9f32.to_le_bytes());
    }
}
