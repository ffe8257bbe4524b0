//! Wire types and field tags.
//!
//! Every field occurrence on the wire starts with a varint tag holding
//! `field_number << 3 | wire_type`.

use crate::varint::encoded_len_varint;
use crate::{Result, WireError};
use std::fmt;

/// Largest field number a tag can carry (29 bits).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Field numbers reserved by the wire format for its own implementation.
pub const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

const WIRE_TYPE_BITS: u32 = 3;
const WIRE_TYPE_MASK: u32 = (1 << WIRE_TYPE_BITS) - 1;

/// On-wire shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    /// Legacy group start. Recognized, never captured.
    StartGroup = 3,
    /// Legacy group end. Terminates the current parse loop.
    EndGroup = 4,
    Fixed32 = 5,
}

impl WireType {
    pub fn from_raw(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            other => Err(WireError::InvalidWireType(other)),
        }
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "VARINT",
            WireType::Fixed64 => "FIXED64",
            WireType::LengthDelimited => "LENGTH_DELIMITED",
            WireType::StartGroup => "START_GROUP",
            WireType::EndGroup => "END_GROUP",
            WireType::Fixed32 => "FIXED32",
        };
        f.write_str(name)
    }
}

/// A raw field tag.
///
/// Only the combined value is stored; the field number and wire type are
/// split out on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(u32);

impl Tag {
    /// Tag value `0`, which marks the end of a message.
    pub const END: Tag = Tag(0);

    /// Combines a field number and wire type (`makeTag`).
    ///
    /// Field numbers are validated when a schema is defined, so this only
    /// debug-asserts the 29-bit ceiling.
    #[inline]
    pub const fn new(field_number: u32, wire_type: WireType) -> Tag {
        debug_assert!(field_number <= MAX_FIELD_NUMBER);
        Tag((field_number << WIRE_TYPE_BITS) | wire_type as u32)
    }

    /// Wraps a decoded varint as a tag.
    ///
    /// # Errors
    /// Returns `InvalidTag` if the value does not fit 32 bits.
    pub fn from_raw(raw: u64) -> Result<Tag> {
        u32::try_from(raw)
            .map(Tag)
            .map_err(|_| WireError::InvalidTag(raw))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn field_number(self) -> u32 {
        self.0 >> WIRE_TYPE_BITS
    }

    /// Raw wire-type bits, which may not name a known [`WireType`].
    #[inline]
    pub const fn wire_type_bits(self) -> u8 {
        (self.0 & WIRE_TYPE_MASK) as u8
    }

    pub fn wire_type(self) -> Result<WireType> {
        WireType::from_raw(self.wire_type_bits())
    }

    /// Decomposes the tag into (field number, wire type) (`splitTag`).
    pub fn split(self) -> Result<(u32, WireType)> {
        Ok((self.field_number(), self.wire_type()?))
    }

    /// True for the markers that end a parse loop: tag 0 or a group end.
    #[inline]
    pub const fn is_end_of_message(self) -> bool {
        self.0 == 0 || self.wire_type_bits() == WireType::EndGroup as u8
    }

    #[inline]
    pub const fn encoded_len(self) -> usize {
        encoded_len_varint(self.0 as u64)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wire_type() {
            Ok(wt) => write!(f, "#{}/{}", self.field_number(), wt),
            Err(_) => write!(f, "#{}/?{}", self.field_number(), self.wire_type_bits()),
        }
    }
}
