use crate::codec;
use crate::config::CodecConfig;
use crate::descriptor::MessageDescriptor;
use crate::message::Message;
use crate::unknown::UnknownFieldStore;
use crate::value::{FieldMut, FieldRef, Value};
use crate::{Result, WireError};
use bytes::Bytes;

/// A record whose layout comes entirely from a runtime descriptor.
///
/// Holds one [`Value`] per declared field, in descriptor order, starting at
/// each field's default.
///
/// ```rust
/// use protolite::{DynamicMessage, Example, Message};
///
/// let mut record = DynamicMessage::new(Example::static_descriptor());
/// record.set(2, 5).unwrap();
/// assert_eq!(&record.encode().unwrap()[..], &[0x10, 0x05]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicMessage<'d> {
    descriptor: &'d MessageDescriptor,
    values: Vec<Value>,
    unknown: UnknownFieldStore,
}

impl<'d> DynamicMessage<'d> {
    pub fn new(descriptor: &'d MessageDescriptor) -> Self {
        let values = descriptor
            .fields()
            .iter()
            .map(|field| field.default_value())
            .collect();
        Self {
            descriptor,
            values,
            unknown: UnknownFieldStore::new(),
        }
    }

    /// Parses a complete record of the given type.
    pub fn parse(descriptor: &'d MessageDescriptor, input: impl Into<Bytes>) -> Result<Self> {
        Self::parse_with_config(descriptor, input, &CodecConfig::default())
    }

    pub fn parse_with_config(
        descriptor: &'d MessageDescriptor,
        input: impl Into<Bytes>,
        config: &CodecConfig,
    ) -> Result<Self> {
        let mut message = Self::new(descriptor);
        codec::parse_into(&mut message, input, config)?;
        Ok(message)
    }

    pub fn get(&self, number: u32) -> Option<&Value> {
        self.descriptor.index_of(number).map(|i| &self.values[i])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.descriptor
            .field_by_name(name)
            .and_then(|field| self.get(field.number()))
    }

    /// Stores `value` into declared field `number`.
    ///
    /// # Errors
    /// `UnknownField` if the number is not declared, `FieldTypeMismatch` if
    /// the value is of another kind.
    pub fn set(&mut self, number: u32, value: impl Into<Value>) -> Result<()> {
        let slot = self
            .field_mut(number)
            .ok_or(WireError::UnknownField(number))?;
        slot.assign(number, value.into())
    }
}

impl Message for DynamicMessage<'_> {
    fn descriptor(&self) -> &MessageDescriptor {
        self.descriptor
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        self.get(number).map(Value::as_field_ref)
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        let index = self.descriptor.index_of(number)?;
        Some(self.values[index].as_field_mut())
    }

    fn unknown_fields(&self) -> &UnknownFieldStore {
        &self.unknown
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldStore {
        &mut self.unknown
    }
}
