use crate::codec;
use crate::config::CodecConfig;
use crate::descriptor::MessageDescriptor;
use crate::unknown::UnknownFieldStore;
use crate::value::{FieldMut, FieldRef};
use crate::writer::WireWriter;
use crate::Result;
use bytes::Bytes;

/// A record the codec can parse, serialize and merge.
///
/// Implementors only expose their field table, typed access to each declared
/// field and their unknown-field store; everything else is provided on top
/// of [`codec`]. Most users should use `#[derive(Message)]` instead of
/// implementing this by hand.
///
/// `Clone` must deep-copy: two records never share string, byte or
/// unknown-field storage.
pub trait Message: Clone {
    fn descriptor(&self) -> &MessageDescriptor;

    /// Borrows the value of declared field `number`, or `None` if the record
    /// type does not declare it.
    fn field(&self, number: u32) -> Option<FieldRef<'_>>;

    /// Write access to declared field `number`.
    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>>;

    fn unknown_fields(&self) -> &UnknownFieldStore;

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldStore;

    /// Parses a complete record.
    ///
    /// # Errors
    /// `DecodeAborted` wrapping the lower-level failure; no partial record
    /// is returned.
    fn decode(input: impl Into<Bytes>) -> Result<Self>
    where
        Self: Default,
    {
        codec::parse(input)
    }

    /// Parses `input` on top of this record's current contents. Fields on
    /// the wire overwrite, unknown fields are appended. On error the record
    /// is left untouched.
    fn merge_from_bytes(&mut self, input: impl Into<Bytes>) -> Result<()> {
        codec::parse_into(self, input, &CodecConfig::default())
    }

    fn encode(&self) -> Result<Bytes> {
        codec::serialize(self)
    }

    fn encode_to(&self, writer: &mut WireWriter) -> Result<()> {
        codec::serialize_to(self, writer)
    }

    fn encoded_len(&self) -> usize {
        codec::byte_size(self)
    }

    fn merge_from(&mut self, other: &Self) -> Result<()> {
        codec::merge(self, other)
    }

    fn copy_from(&mut self, other: &Self) -> Result<()> {
        codec::copy_from(self, other)
    }

    fn clear(&mut self) {
        codec::clear(self)
    }

    /// Implicit-presence scalar records have no required fields.
    fn is_initialized(&self) -> bool {
        true
    }
}
