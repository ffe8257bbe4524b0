//! Typed field values.
//!
//! [`Value`] owns its payload, [`FieldRef`] borrows it from a record and
//! [`FieldMut`] writes into a record's storage. The codec only ever moves
//! data through these three, which keeps it independent of how a record
//! lays out its fields.

use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::reader::WireReader;
use crate::varint::{encoded_len_int32, encoded_len_varint, int32_from_varint};
use crate::writer::WireWriter;
use crate::{Result, WireError};

/// An owned field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
    Bytes(Vec<u8>),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        self.as_field_ref().kind()
    }

    pub fn is_default(&self) -> bool {
        self.as_field_ref().is_default()
    }

    pub fn as_field_ref(&self) -> FieldRef<'_> {
        match self {
            Value::String(v) => FieldRef::String(v),
            Value::Bytes(v) => FieldRef::Bytes(v),
            Value::Int32(v) => FieldRef::Int32(*v),
            Value::Int64(v) => FieldRef::Int64(*v),
            Value::UInt32(v) => FieldRef::UInt32(*v),
            Value::UInt64(v) => FieldRef::UInt64(*v),
            Value::Bool(v) => FieldRef::Bool(*v),
        }
    }

    pub fn as_field_mut(&mut self) -> FieldMut<'_> {
        match self {
            Value::String(v) => FieldMut::String(v),
            Value::Bytes(v) => FieldMut::Bytes(v),
            Value::Int32(v) => FieldMut::Int32(v),
            Value::Int64(v) => FieldMut::Int64(v),
            Value::UInt32(v) => FieldMut::UInt32(v),
            Value::UInt64(v) => FieldMut::UInt64(v),
            Value::Bool(v) => FieldMut::Bool(v),
        }
    }

    /// Builds a string value from raw bytes.
    ///
    /// # Errors
    /// `InvalidUtf8` if `bytes` is not valid UTF-8.
    pub fn string_from_utf8(field: &str, bytes: Vec<u8>) -> Result<Value> {
        String::from_utf8(bytes)
            .map(Value::String)
            .map_err(|e| WireError::InvalidUtf8 {
                field: field.to_string(),
                source: e.utf8_error(),
            })
    }

    /// Decodes the value of one occurrence of `field`, whose tag has already
    /// been read and matched.
    ///
    /// Length-delimited payloads are copied out of the reader.
    pub(crate) fn read(field: &FieldDescriptor, reader: &mut WireReader) -> Result<Value> {
        let value = match field.kind() {
            FieldKind::String => {
                let raw = reader.read_length_delimited()?;
                let text = std::str::from_utf8(&raw).map_err(|source| WireError::InvalidUtf8 {
                    field: field.name().to_string(),
                    source,
                })?;
                Value::String(text.to_owned())
            }
            FieldKind::Bytes => Value::Bytes(reader.read_length_delimited()?.to_vec()),
            FieldKind::Int32 => Value::Int32(int32_from_varint(reader.read_varint()?)),
            FieldKind::Int64 => Value::Int64(reader.read_varint()? as i64),
            FieldKind::UInt32 => Value::UInt32(reader.read_varint()? as u32),
            FieldKind::UInt64 => Value::UInt64(reader.read_varint()?),
            FieldKind::Bool => Value::Bool(reader.read_varint()? != 0),
        };
        Ok(value)
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from!(
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    bool => Bool,
);

/// A field value borrowed from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    String(&'a str),
    Bytes(&'a [u8]),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
}

impl FieldRef<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldRef::String(_) => FieldKind::String,
            FieldRef::Bytes(_) => FieldKind::Bytes,
            FieldRef::Int32(_) => FieldKind::Int32,
            FieldRef::Int64(_) => FieldKind::Int64,
            FieldRef::UInt32(_) => FieldKind::UInt32,
            FieldRef::UInt64(_) => FieldKind::UInt64,
            FieldRef::Bool(_) => FieldKind::Bool,
        }
    }

    /// True when the value equals its kind's implicit default and is
    /// therefore never written.
    pub fn is_default(&self) -> bool {
        match *self {
            FieldRef::String(v) => v.is_empty(),
            FieldRef::Bytes(v) => v.is_empty(),
            FieldRef::Int32(v) => v == 0,
            FieldRef::Int64(v) => v == 0,
            FieldRef::UInt32(v) => v == 0,
            FieldRef::UInt64(v) => v == 0,
            FieldRef::Bool(v) => !v,
        }
    }

    pub fn to_value(&self) -> Value {
        match *self {
            FieldRef::String(v) => Value::String(v.to_owned()),
            FieldRef::Bytes(v) => Value::Bytes(v.to_vec()),
            FieldRef::Int32(v) => Value::Int32(v),
            FieldRef::Int64(v) => Value::Int64(v),
            FieldRef::UInt32(v) => Value::UInt32(v),
            FieldRef::UInt64(v) => Value::UInt64(v),
            FieldRef::Bool(v) => Value::Bool(v),
        }
    }

    /// Encoded size of the value alone, without its tag.
    pub fn encoded_len(&self) -> usize {
        match *self {
            FieldRef::String(v) => encoded_len_varint(v.len() as u64) + v.len(),
            FieldRef::Bytes(v) => encoded_len_varint(v.len() as u64) + v.len(),
            FieldRef::Int32(v) => encoded_len_int32(v),
            FieldRef::Int64(v) => encoded_len_varint(v as u64),
            FieldRef::UInt32(v) => encoded_len_varint(v as u64),
            FieldRef::UInt64(v) => encoded_len_varint(v),
            FieldRef::Bool(_) => 1,
        }
    }

    pub fn write(&self, writer: &mut WireWriter) {
        match *self {
            FieldRef::String(v) => writer.write_length_delimited(v.as_bytes()),
            FieldRef::Bytes(v) => writer.write_length_delimited(v),
            FieldRef::Int32(v) => writer.write_varint(v as i64 as u64),
            FieldRef::Int64(v) => writer.write_varint(v as u64),
            FieldRef::UInt32(v) => writer.write_varint(v as u64),
            FieldRef::UInt64(v) => writer.write_varint(v),
            FieldRef::Bool(v) => writer.write_varint(v as u64),
        }
    }
}

/// Write access to one field's storage inside a record.
#[derive(Debug)]
pub enum FieldMut<'a> {
    String(&'a mut String),
    Bytes(&'a mut Vec<u8>),
    Int32(&'a mut i32),
    Int64(&'a mut i64),
    UInt32(&'a mut u32),
    UInt64(&'a mut u64),
    Bool(&'a mut bool),
}

impl FieldMut<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldMut::String(_) => FieldKind::String,
            FieldMut::Bytes(_) => FieldKind::Bytes,
            FieldMut::Int32(_) => FieldKind::Int32,
            FieldMut::Int64(_) => FieldKind::Int64,
            FieldMut::UInt32(_) => FieldKind::UInt32,
            FieldMut::UInt64(_) => FieldKind::UInt64,
            FieldMut::Bool(_) => FieldKind::Bool,
        }
    }

    /// Replaces the stored value.
    ///
    /// # Errors
    /// `FieldTypeMismatch` if `value` is of another kind; the storage is left
    /// unchanged.
    pub fn assign(self, number: u32, value: Value) -> Result<()> {
        match (self, value) {
            (FieldMut::String(dst), Value::String(v)) => *dst = v,
            (FieldMut::Bytes(dst), Value::Bytes(v)) => *dst = v,
            (FieldMut::Int32(dst), Value::Int32(v)) => *dst = v,
            (FieldMut::Int64(dst), Value::Int64(v)) => *dst = v,
            (FieldMut::UInt32(dst), Value::UInt32(v)) => *dst = v,
            (FieldMut::UInt64(dst), Value::UInt64(v)) => *dst = v,
            (FieldMut::Bool(dst), Value::Bool(v)) => *dst = v,
            (dst, v) => {
                return Err(WireError::FieldTypeMismatch {
                    number,
                    expected: dst.kind(),
                    actual: v.kind(),
                })
            }
        }
        Ok(())
    }

    /// Resets the storage to the kind's default, keeping string and byte
    /// allocations for reuse.
    pub fn reset(self) {
        match self {
            FieldMut::String(v) => v.clear(),
            FieldMut::Bytes(v) => v.clear(),
            FieldMut::Int32(v) => *v = 0,
            FieldMut::Int64(v) => *v = 0,
            FieldMut::UInt32(v) => *v = 0,
            FieldMut::UInt64(v) => *v = 0,
            FieldMut::Bool(v) => *v = false,
        }
    }
}

/// Rust types usable as declared scalar fields.
///
/// `#[derive(Message)]` maps each field through this trait, so adding a
/// field kind means adding a [`FieldKind`] and an impl here.
pub trait ScalarField {
    const KIND: FieldKind;

    fn as_field_ref(&self) -> FieldRef<'_>;

    fn as_field_mut(&mut self) -> FieldMut<'_>;
}

macro_rules! impl_scalar_field {
    ($($ty:ty => $variant:ident, $kind:ident;)*) => {
        $(
            impl ScalarField for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                #[inline]
                fn as_field_ref(&self) -> FieldRef<'_> {
                    FieldRef::$variant(self)
                }

                #[inline]
                fn as_field_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::$variant(self)
                }
            }
        )*
    };
}

impl_scalar_field! {
    String => String, String;
    Vec<u8> => Bytes, Bytes;
}

macro_rules! impl_scalar_field_copy {
    ($($ty:ty => $variant:ident, $kind:ident;)*) => {
        $(
            impl ScalarField for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                #[inline]
                fn as_field_ref(&self) -> FieldRef<'_> {
                    FieldRef::$variant(*self)
                }

                #[inline]
                fn as_field_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::$variant(self)
                }
            }
        )*
    };
}

impl_scalar_field_copy! {
    i32 => Int32, Int32;
    i64 => Int64, Int64;
    u32 => UInt32, UInt32;
    u64 => UInt64, UInt64;
    bool => Bool, Bool;
}
