//! Schema tables that drive the generic codec.
//!
//! A [`MessageDescriptor`] lists the declared fields of one record type in
//! ascending field-number order. Descriptors are plain data: they can be
//! `static` (as `#[derive(Message)]` emits them) or built at runtime and kept
//! in a [`DescriptorRegistry`].

use crate::value::Value;
use crate::wire::{WireType, MAX_FIELD_NUMBER, RESERVED_FIELD_NUMBERS};
use crate::{Result, WireError};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Scalar type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Bytes,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Bool,
}

impl FieldKind {
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldKind::String | FieldKind::Bytes => WireType::LengthDelimited,
            FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::UInt32
            | FieldKind::UInt64
            | FieldKind::Bool => WireType::Varint,
        }
    }

    /// The implicit-presence default: empty, zero or false.
    pub fn default_value(self) -> Value {
        match self {
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Int32 => Value::Int32(0),
            FieldKind::Int64 => Value::Int64(0),
            FieldKind::UInt32 => Value::UInt32(0),
            FieldKind::UInt64 => Value::UInt64(0),
            FieldKind::Bool => Value::Bool(false),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::Bool => "bool",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    number: u32,
    name: Cow<'static, str>,
    kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn new(number: u32, name: &'static str, kind: FieldKind) -> Self {
        Self {
            number,
            name: Cow::Borrowed(name),
            kind,
        }
    }

    pub fn owned(number: u32, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            number,
            name: Cow::Owned(name.into()),
            kind,
        }
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[inline]
    pub fn wire_type(&self) -> WireType {
        self.kind.wire_type()
    }

    pub fn default_value(&self) -> Value {
        self.kind.default_value()
    }
}

/// Field table for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    full_name: Cow<'static, str>,
    fields: Cow<'static, [FieldDescriptor]>,
}

impl MessageDescriptor {
    /// Wraps a static field table.
    ///
    /// The table must already be in ascending field-number order; call
    /// [`validate`](Self::validate) once at startup (or register the
    /// descriptor) to check it.
    pub const fn new(full_name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self {
            full_name: Cow::Borrowed(full_name),
            fields: Cow::Borrowed(fields),
        }
    }

    /// Builds and validates a descriptor at runtime. Fields may be given in
    /// any order.
    pub fn from_fields(
        full_name: impl Into<String>,
        mut fields: Vec<FieldDescriptor>,
    ) -> Result<Self> {
        fields.sort_by_key(FieldDescriptor::number);
        let descriptor = Self {
            full_name: Cow::Owned(full_name.into()),
            fields: Cow::Owned(fields),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Checks the schema-definition rules: a non-empty name, field numbers
    /// in `1..=MAX_FIELD_NUMBER` outside the reserved range, strictly
    /// ascending, and unique field names.
    pub fn validate(&self) -> Result<()> {
        if self.full_name.is_empty() {
            return Err(WireError::InvalidDescriptor(
                "message name must not be empty".to_string(),
            ));
        }
        let mut previous = 0u32;
        for field in self.fields.iter() {
            let n = field.number;
            if n == 0 || n > MAX_FIELD_NUMBER {
                return Err(WireError::InvalidDescriptor(format!(
                    "{}.{}: field number {} outside 1..={}",
                    self.full_name, field.name, n, MAX_FIELD_NUMBER
                )));
            }
            if RESERVED_FIELD_NUMBERS.contains(&n) {
                return Err(WireError::InvalidDescriptor(format!(
                    "{}.{}: field number {} is reserved",
                    self.full_name, field.name, n
                )));
            }
            if n <= previous {
                return Err(WireError::InvalidDescriptor(format!(
                    "{}.{}: field number {} is duplicated or out of order",
                    self.full_name, field.name, n
                )));
            }
            previous = n;
        }
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(WireError::InvalidDescriptor(format!(
                    "{}: field name '{}' declared twice",
                    self.full_name, field.name
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Declared fields, ascending by number.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Position of `number` in [`fields`](Self::fields).
    pub fn index_of(&self, number: u32) -> Option<usize> {
        self.fields.binary_search_by_key(&number, |f| f.number).ok()
    }

    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.index_of(number).map(|i| &self.fields[i])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Source of descriptors by fully-qualified record name.
pub trait DescriptorRegistry {
    fn find(&self, full_name: &str) -> Option<&MessageDescriptor>;
}

/// In-memory registry, filled once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    by_name: HashMap<String, MessageDescriptor>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and adds a descriptor.
    ///
    /// # Errors
    /// `InvalidDescriptor` if the table is invalid or the name is taken.
    pub fn register(&mut self, descriptor: MessageDescriptor) -> Result<()> {
        descriptor.validate()?;
        let name = descriptor.full_name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(WireError::InvalidDescriptor(format!(
                "{} is already registered",
                name
            )));
        }
        log::debug!("registered descriptor {} ({} fields)", name, descriptor.fields().len());
        self.by_name.insert(name, descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl DescriptorRegistry for StaticRegistry {
    fn find(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.by_name.get(full_name)
    }
}
