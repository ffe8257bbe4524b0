//! # protolite
//!
//! A compact, schema-driven codec for the protobuf binary wire format.
//!
//! - Records are described by a [`MessageDescriptor`] table; one generic codec
//!   parses, serializes, sizes, merges and clears every record type
//! - Forward/backward compatible: fields the schema does not declare (or that
//!   arrive with an unexpected wire type) are kept verbatim and written back
//!   after the known fields
//! - Implicit presence: a field equal to its default is never written
//! - `byte_size` always equals the length `serialize` produces, so output
//!   buffers are allocated once
//!
//! ## Field kinds
//!
//! | Kind     | Rust type | Wire type        |
//! |----------|-----------|------------------|
//! | `string` | `String`  | length-delimited |
//! | `bytes`  | `Vec<u8>` | length-delimited |
//! | `int32`  | `i32`     | varint           |
//! | `int64`  | `i64`     | varint           |
//! | `uint32` | `u32`     | varint           |
//! | `uint64` | `u64`     | varint           |
//! | `bool`   | `bool`    | varint           |
//!
//! ## Attribute Macros
//!
//! With the `derive` feature (on by default), `#[derive(Message)]` builds the
//! descriptor table and field accessors for a struct:
//!
//! - `#[proto(name = "pkg.Name")]` on the struct: fully-qualified record name.
//! - `#[proto(number = N)]` on a field: declares it with field number `N`.
//! - `#[proto(unknown)]` on one `UnknownFieldStore` field: unknown-field storage.
//!
//! Fields without a `#[proto]` attribute are not part of the wire format.
//!
//! ## Example
//!
//! ```rust
//! use protolite::{Example, Message};
//!
//! let record = Example { str: "hi".to_string(), i32: 300, ..Default::default() };
//! let bytes = record.encode().unwrap();
//! assert_eq!(&bytes[..], &[0x0A, 0x02, 0x68, 0x69, 0x10, 0xAC, 0x02]);
//! assert_eq!(Example::decode(bytes).unwrap(), record);
//! ```

pub mod codec;
mod config;
pub mod descriptor;
mod dynamic;
mod example;
mod message;
pub mod reader;
mod unknown;
mod value;
pub mod varint;
pub mod wire;
pub mod writer;

use bytes::Bytes;

pub use config::{CodecConfig, DEFAULT_MAX_MESSAGE_SIZE};
pub use descriptor::{
    DescriptorRegistry, FieldDescriptor, FieldKind, MessageDescriptor, StaticRegistry,
};
pub use dynamic::DynamicMessage;
pub use example::Example;
pub use message::Message;
#[cfg(feature = "derive")]
pub use protolite_derive::Message;
pub use reader::WireReader;
pub use unknown::{UnknownField, UnknownFieldStore};
pub use value::{FieldMut, FieldRef, ScalarField, Value};
pub use wire::{Tag, WireType};
pub use writer::WireWriter;

/// Errors that can occur during encoding, decoding or schema definition.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Fewer bytes were available than a length prefix or fixed-width value declared.
    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },
    /// A varint did not terminate within 10 bytes or before the input ended.
    #[error("Malformed varint")]
    MalformedVarint,
    /// A string field held bytes that are not valid UTF-8.
    #[error("Invalid UTF-8 in string field '{field}': {source}")]
    InvalidUtf8 {
        field: String,
        #[source]
        source: std::str::Utf8Error,
    },
    /// A tag carried a wire type that cannot be decoded or captured.
    #[error("Invalid wire type: {0}")]
    InvalidWireType(u8),
    /// A tag was wider than 32 bits or named field number 0.
    #[error("Invalid tag: {0}")]
    InvalidTag(u64),
    /// The input exceeded `CodecConfig::max_message_size`.
    #[error("Message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge { size: usize, limit: usize },
    /// A value of one kind was stored into a field of another.
    #[error("Field {number} is {expected}, got {actual}")]
    FieldTypeMismatch {
        number: u32,
        expected: FieldKind,
        actual: FieldKind,
    },
    /// A field number the record type does not declare.
    #[error("Field {0} is not declared")]
    UnknownField(u32),
    /// Two records of different types were merged.
    #[error("Cannot merge {actual} into {expected}")]
    DescriptorMismatch { expected: String, actual: String },
    /// A schema table broke a definition rule.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
    /// Parsing stopped; no partial record was produced.
    #[error("Decoding {message} aborted at offset {offset}: {source}")]
    DecodeAborted {
        message: String,
        offset: usize,
        #[source]
        source: Box<WireError>,
    },
}

impl WireError {
    /// The innermost error, looking through `DecodeAborted`.
    pub fn root_cause(&self) -> &WireError {
        match self {
            WireError::DecodeAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, WireError>;

/// Convenience function to decode a record from bytes.
///
/// This is equivalent to calling `T::decode(input)`.
///
/// # Example
/// ```rust
/// use protolite::{decode, Example};
///
/// let record: Example = decode(vec![0x10, 0x05]).unwrap();
/// assert_eq!(record.i32, 5);
/// ```
pub fn decode<T: Message + Default>(input: impl Into<Bytes>) -> Result<T> {
    codec::parse(input)
}

/// Convenience function to encode a record to bytes.
///
/// This is equivalent to calling `value.encode()`.
///
/// # Example
/// ```rust
/// use protolite::{encode, Example};
///
/// let bytes = encode(&Example::default()).unwrap();
/// assert!(bytes.is_empty());
/// ```
pub fn encode<T: Message>(value: &T) -> Result<Bytes> {
    codec::serialize(value)
}
