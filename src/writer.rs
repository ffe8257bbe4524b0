use crate::varint::encode_varint;
use crate::wire::Tag;
use bytes::{BufMut, Bytes, BytesMut};

/// Append-only output sink for encoded fields.
///
/// Sized up front from a `byte_size` computation; appends made in the order
/// that computation assumed never grow the buffer. Writing past the reserved
/// capacity still works, it just reallocates.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn write_tag(&mut self, tag: Tag) {
        encode_varint(tag.raw() as u64, &mut self.buf);
    }

    #[inline]
    pub fn write_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buf);
    }

    /// Writes a length prefix followed by `bytes`.
    #[inline]
    pub fn write_length_delimited(&mut self, bytes: &[u8]) {
        encode_varint(bytes.len() as u64, &mut self.buf);
        self.buf.put_slice(bytes);
    }

    /// Writes already-encoded bytes verbatim.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn into_inner(self) -> BytesMut {
        self.buf
    }
}
