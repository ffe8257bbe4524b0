use proptest::prelude::*;
use protolite::{codec, FieldKind, Message, Tag, UnknownFieldStore, WireType};

#[derive(Message, Debug, Clone, Default, PartialEq)]
#[proto(name = "pkg.Example")]
struct DerivedExample {
    #[proto(number = 1)]
    str: String,
    #[proto(number = 2)]
    i32: i32,
    #[proto(unknown)]
    unknown: UnknownFieldStore,
}

/// Declared out of order on purpose; the table is sorted by number.
#[derive(Message, Debug, Clone, Default, PartialEq)]
#[proto(name = "test.AllKinds")]
struct AllKinds {
    #[proto(number = 7)]
    flag: bool,
    #[proto(number = 1)]
    name: String,
    #[proto(number = 2)]
    payload: Vec<u8>,
    #[proto(number = 3)]
    small: i32,
    #[proto(number = 4)]
    large: i64,
    #[proto(number = 5)]
    count: u32,
    #[proto(number = 6)]
    total: u64,
    // Not part of the wire format
    cache: Option<usize>,
    #[proto(unknown)]
    unknown: UnknownFieldStore,
}

/// A newer version of `DerivedExample` with an extra field.
#[derive(Message, Debug, Clone, Default, PartialEq)]
#[proto(name = "pkg.Example")]
struct ExampleV2 {
    #[proto(number = 1)]
    str: String,
    #[proto(number = 2)]
    i32: i32,
    #[proto(number = 3)]
    tags: String,
    #[proto(unknown)]
    unknown: UnknownFieldStore,
}

#[test]
fn test_derived_descriptor() {
    let record = AllKinds::default();
    let descriptor = record.descriptor();
    assert_eq!(descriptor.full_name(), "test.AllKinds");
    descriptor.validate().unwrap();

    let numbers: Vec<u32> = descriptor.fields().iter().map(|f| f.number()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(descriptor.field(2).unwrap().kind(), FieldKind::Bytes);
    assert_eq!(descriptor.field(4).unwrap().kind(), FieldKind::Int64);
    assert_eq!(descriptor.field(7).unwrap().name(), "flag");
    assert!(descriptor.field(8).is_none());
}

#[test]
fn test_derived_matches_handwritten_example() {
    let derived = DerivedExample {
        str: "hi".to_string(),
        i32: 300,
        ..Default::default()
    };
    let handwritten = protolite::Example::new("hi", 300);
    assert_eq!(derived.encode().unwrap(), handwritten.encode().unwrap());
    assert_eq!(
        &derived.encode().unwrap()[..],
        &[0x0A, 0x02, 0x68, 0x69, 0x10, 0xAC, 0x02]
    );
}

#[test]
fn test_all_kinds_encoding() {
    let record = AllKinds {
        flag: true,
        name: "a".to_string(),
        payload: vec![0xFF, 0x00],
        small: -2,
        large: -3,
        count: 150,
        total: 1,
        cache: Some(42),
        unknown: UnknownFieldStore::new(),
    };
    let bytes = record.encode().unwrap();
    let mut expected = vec![0x0A, 0x01, 0x61, 0x12, 0x02, 0xFF, 0x00];
    // small = -2 and large = -3, both sign-extended to ten bytes
    expected.push(0x18);
    expected.extend_from_slice(&[0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
    expected.push(0x20);
    expected.extend_from_slice(&[0xFD, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
    expected.extend_from_slice(&[0x28, 0x96, 0x01, 0x30, 0x01, 0x38, 0x01]);
    assert_eq!(&bytes[..], &expected[..]);
    assert_eq!(record.encoded_len(), expected.len());

    let decoded = AllKinds::decode(bytes).unwrap();
    // Fields outside the wire format come back as default
    assert_eq!(decoded.cache, None);
    assert_eq!(
        decoded,
        AllKinds {
            cache: None,
            ..record
        }
    );
}

#[test]
fn test_bytes_field_accepts_invalid_utf8() {
    let record = AllKinds::decode(vec![0x12, 0x01, 0xFF]).unwrap();
    assert_eq!(record.payload, vec![0xFF]);
}

#[test]
fn test_uint32_truncates_and_bool_accepts_any_nonzero() {
    let mut input = vec![0x28];
    input.extend_from_slice(&[0x80, 0x80, 0x80, 0x80, 0x10]); // 1 << 32
    input.extend_from_slice(&[0x38, 0x02]);
    let record = AllKinds::decode(input).unwrap();
    assert_eq!(record.count, 0);
    assert!(record.flag);
}

#[test]
fn test_old_reader_keeps_new_fields() {
    let newer = ExampleV2 {
        str: "hi".to_string(),
        i32: 1,
        tags: "x,y".to_string(),
        ..Default::default()
    };
    let bytes = newer.encode().unwrap();

    // An older schema keeps field 3 opaque...
    let mut older = DerivedExample::decode(bytes.clone()).unwrap();
    assert_eq!(older.unknown.len(), 1);
    older.i32 = 2;

    // ...and writes it back so the newer schema still sees it
    let roundtrip = ExampleV2::decode(older.encode().unwrap()).unwrap();
    assert_eq!(roundtrip.tags, "x,y");
    assert_eq!(roundtrip.i32, 2);
    assert!(roundtrip.unknown.is_empty());
}

#[test]
fn test_new_reader_defaults_missing_fields() {
    let older = DerivedExample {
        str: "hi".to_string(),
        ..Default::default()
    };
    let newer = ExampleV2::decode(older.encode().unwrap()).unwrap();
    assert_eq!(newer.str, "hi");
    assert_eq!(newer.tags, "");
}

#[test]
fn test_derived_merge_and_clear() {
    let mut dst = DerivedExample {
        str: "x".to_string(),
        ..Default::default()
    };
    let mut src = DerivedExample {
        i32: 5,
        ..Default::default()
    };
    src.unknown.append(Tag::new(9, WireType::Varint), vec![0x01]);

    codec::merge(&mut dst, &src).unwrap();
    assert_eq!(dst.str, "x");
    assert_eq!(dst.i32, 5);
    assert_eq!(dst.unknown.len(), 1);

    dst.clear();
    assert_eq!(dst, DerivedExample::default());
}

fn all_kinds_strategy() -> impl Strategy<Value = AllKinds> {
    (
        any::<String>(),
        prop::collection::vec(any::<u8>(), 0..16),
        any::<i32>(),
        any::<i64>(),
        any::<u32>(),
        any::<u64>(),
        any::<bool>(),
    )
        .prop_map(|(name, payload, small, large, count, total, flag)| AllKinds {
            flag,
            name,
            payload,
            small,
            large,
            count,
            total,
            cache: None,
            unknown: UnknownFieldStore::new(),
        })
}

proptest! {
    #[test]
    fn should_roundtrip_all_kinds(record in all_kinds_strategy()) {
        let bytes = record.encode().unwrap();
        prop_assert_eq!(bytes.len(), record.encoded_len());
        let decoded = AllKinds::decode(bytes).unwrap();
        prop_assert_eq!(decoded, record);
    }
}
