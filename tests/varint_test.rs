use bytes::{Bytes, BytesMut};
use proptest::prelude::*;
use protolite::varint::{
    decode_varint, encode_int32, encode_varint, encoded_len_int32, encoded_len_varint,
    int32_from_varint, peek_varint, MAX_VARINT_LEN,
};
use protolite::WireError;

fn encode(value: u64) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_varint(value, &mut buf);
    buf.to_vec()
}

#[test]
fn test_varint_known_encodings() {
    assert_eq!(encode(0), vec![0x00]);
    assert_eq!(encode(1), vec![0x01]);
    assert_eq!(encode(127), vec![0x7F]);
    assert_eq!(encode(128), vec![0x80, 0x01]);
    assert_eq!(encode(300), vec![0xAC, 0x02]);
    assert_eq!(encode(16_384), vec![0x80, 0x80, 0x01]);
    assert_eq!(
        encode(u64::MAX),
        vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
    );
}

#[test]
fn test_varint_decode_advances_reader() {
    let mut reader = Bytes::from_static(&[0xAC, 0x02, 0x05]);
    assert_eq!(decode_varint(&mut reader).unwrap(), 300);
    assert_eq!(decode_varint(&mut reader).unwrap(), 5);
    assert!(reader.is_empty());
}

#[test]
fn test_varint_unterminated_is_malformed() {
    // Input ends while the continuation bit is still set
    let mut reader = Bytes::from_static(&[0x80, 0x80]);
    assert!(matches!(
        decode_varint(&mut reader),
        Err(WireError::MalformedVarint)
    ));
    // Reader is not advanced on failure
    assert_eq!(reader.len(), 2);

    let mut empty = Bytes::new();
    assert!(matches!(
        decode_varint(&mut empty),
        Err(WireError::MalformedVarint)
    ));
}

#[test]
fn test_varint_longer_than_ten_bytes_is_malformed() {
    let bytes = [0xFFu8; 11];
    assert!(matches!(
        peek_varint(&bytes),
        Err(WireError::MalformedVarint)
    ));
    // Ten continuation bytes followed by a terminator is still too long
    let mut long = vec![0x80u8; MAX_VARINT_LEN];
    long.push(0x00);
    assert!(matches!(peek_varint(&long), Err(WireError::MalformedVarint)));
}

#[test]
fn test_varint_tenth_byte_overflow_bits_are_discarded() {
    // Only the lowest bit of the tenth byte fits in a u64
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
    let (value, len) = peek_varint(&bytes).unwrap();
    assert_eq!(value, u64::MAX);
    assert_eq!(len, 10);
}

#[test]
fn test_int32_negative_takes_ten_bytes() {
    let mut buf = BytesMut::new();
    encode_int32(-1, &mut buf);
    assert_eq!(buf.len(), 10);
    assert_eq!(encoded_len_int32(-1), 10);
    assert_eq!(encoded_len_int32(i32::MIN), 10);
    assert_eq!(encoded_len_int32(300), 2);

    let mut reader = buf.freeze();
    let raw = decode_varint(&mut reader).unwrap();
    assert_eq!(int32_from_varint(raw), -1);
}

#[test]
fn test_int32_truncates_wide_values() {
    assert_eq!(int32_from_varint((1u64 << 32) + 7), 7);
    assert_eq!(int32_from_varint(0xFFFF_FFFF), -1);
}

proptest! {
    #[test]
    fn should_roundtrip_any_u64(value: u64) {
        let encoded = encode(value);
        let mut reader = Bytes::from(encoded.clone());
        prop_assert_eq!(decode_varint(&mut reader).unwrap(), value);
        prop_assert!(reader.is_empty());
        prop_assert_eq!(encoded.len(), encoded_len_varint(value));
    }

    #[test]
    fn should_be_minimal_length(value: u64) {
        let encoded = encode(value);
        // A trailing zero group would mean the encoding could be shorter
        if encoded.len() > 1 {
            prop_assert_ne!(*encoded.last().unwrap(), 0x00);
        }
        for byte in &encoded[..encoded.len() - 1] {
            prop_assert!(byte & 0x80 != 0);
        }
        prop_assert!(encoded.last().unwrap() & 0x80 == 0);
    }

    #[test]
    fn should_roundtrip_any_i32(value: i32) {
        let mut buf = BytesMut::new();
        encode_int32(value, &mut buf);
        prop_assert_eq!(buf.len(), encoded_len_int32(value));
        let mut reader = buf.freeze();
        let raw = decode_varint(&mut reader).unwrap();
        prop_assert_eq!(int32_from_varint(raw), value);
    }
}
