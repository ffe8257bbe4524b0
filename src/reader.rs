use crate::varint::{decode_varint, peek_varint};
use crate::wire::{Tag, WireType};
use crate::{Result, WireError};
use bytes::{Buf, Bytes};

/// Cursor over an encoded message.
///
/// Slices returned by the `read_*` methods share the input buffer. Callers
/// that keep a value beyond the parse copy it out first.
#[derive(Debug, Clone)]
pub struct WireReader {
    buf: Bytes,
    total: usize,
}

impl WireReader {
    pub fn new(input: impl Into<Bytes>) -> Self {
        let buf = input.into();
        let total = buf.len();
        Self { buf, total }
    }

    /// True once every input byte has been consumed.
    #[inline]
    pub fn done(&self) -> bool {
        !self.buf.has_remaining()
    }

    /// Offset of the next unread byte from the start of the input.
    #[inline]
    pub fn position(&self) -> usize {
        self.total - self.buf.remaining()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        let raw = self.read_varint()?;
        Tag::from_raw(raw)
    }

    /// Reads a tag and also returns the bytes it occupied on the wire.
    pub fn read_tag_with_bytes(&mut self) -> Result<(Tag, Bytes)> {
        self.ensure(1)?;
        let (raw, len) = peek_varint(self.buf.chunk())?;
        let tag = Tag::from_raw(raw)?;
        Ok((tag, self.buf.split_to(len)))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        self.ensure(1)?;
        decode_varint(&mut self.buf)
    }

    /// Reads a length prefix and then that many bytes.
    ///
    /// # Errors
    /// `TruncatedInput` if fewer bytes remain than the prefix declares.
    pub fn read_length_delimited(&mut self) -> Result<Bytes> {
        let len = self.read_length()?;
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Consumes the payload of one field occurrence without interpreting it.
    ///
    /// The returned bytes are exactly what followed the tag on the wire, length
    /// prefix included, so writing the tag and then these bytes reproduces the
    /// original occurrence.
    ///
    /// # Errors
    /// `InvalidWireType` for group markers, which are never captured.
    pub fn read_raw_for_unknown(&mut self, wire_type: WireType) -> Result<Bytes> {
        let len = match wire_type {
            WireType::Varint => {
                self.ensure(1)?;
                peek_varint(self.buf.chunk())?.1
            }
            WireType::Fixed64 => 8,
            WireType::Fixed32 => 4,
            WireType::LengthDelimited => {
                self.ensure(1)?;
                let (declared, prefix_len) = peek_varint(self.buf.chunk())?;
                usize::try_from(declared)
                    .ok()
                    .and_then(|n| n.checked_add(prefix_len))
                    .ok_or(WireError::TruncatedInput {
                        needed: usize::MAX,
                        remaining: self.buf.remaining(),
                    })?
            }
            WireType::StartGroup | WireType::EndGroup => {
                return Err(WireError::InvalidWireType(wire_type.as_raw()));
            }
        };
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Consumes one field occurrence and drops it.
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<()> {
        self.read_raw_for_unknown(wire_type).map(drop)
    }

    fn read_length(&mut self) -> Result<usize> {
        let declared = self.read_varint()?;
        usize::try_from(declared).map_err(|_| WireError::TruncatedInput {
            needed: usize::MAX,
            remaining: self.buf.remaining(),
        })
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(WireError::TruncatedInput { needed, remaining });
        }
        Ok(())
    }
}
