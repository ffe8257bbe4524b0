//! Base-128 variable-length integers.
//!
//! Seven bits per byte, least-significant group first. Every byte except the
//! last has the continuation bit (`0x80`) set. Encoding is always minimal.

use crate::{Result, WireError};
use bytes::{Buf, BufMut, Bytes};

/// Longest varint the wire format allows (ceil(64 / 7)).
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7F;

/// Appends `value` to `writer` in minimal-length varint form.
#[inline]
pub fn encode_varint(mut value: u64, writer: &mut impl BufMut) {
    while value >= CONTINUATION as u64 {
        writer.put_u8((value as u8 & PAYLOAD_MASK) | CONTINUATION);
        value >>= 7;
    }
    writer.put_u8(value as u8);
}

/// Reads one varint from `reader`, advancing past it.
///
/// # Errors
/// Returns `MalformedVarint` if the input ends before a terminating byte or if
/// more than [`MAX_VARINT_LEN`] bytes carry the continuation bit. The reader is
/// left untouched on failure.
#[inline]
pub fn decode_varint(reader: &mut Bytes) -> Result<u64> {
    let (value, len) = peek_varint(reader.chunk())?;
    reader.advance(len);
    Ok(value)
}

/// Decodes the varint at the start of `bytes` without consuming it.
///
/// Returns the value and the number of bytes it occupies.
pub fn peek_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        // The tenth byte only contributes the top bit of a u64; anything above
        // it is discarded as the wire format allows.
        value |= ((byte & PAYLOAD_MASK) as u64) << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(WireError::MalformedVarint)
}

/// Number of bytes [`encode_varint`] emits for `value`.
#[inline]
pub const fn encoded_len_varint(value: u64) -> usize {
    // Bits needed (at least one) rounded up to 7-bit groups.
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Encodes a signed 32-bit field value.
///
/// Negative values are sign-extended to 64 bits, so they always take ten bytes.
#[inline]
pub fn encode_int32(value: i32, writer: &mut impl BufMut) {
    encode_varint(value as i64 as u64, writer);
}

/// Truncates a decoded varint to the 32-bit field width.
#[inline]
pub const fn int32_from_varint(raw: u64) -> i32 {
    raw as u32 as i32
}

#[inline]
pub const fn encoded_len_int32(value: i32) -> usize {
    encoded_len_varint(value as i64 as u64)
}
