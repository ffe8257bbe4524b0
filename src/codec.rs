//! The generic record codec.
//!
//! Every operation here is driven by the record's [`MessageDescriptor`]; no
//! per-type encode/decode code exists. `serialize_to` and `byte_size` walk
//! the same [`present_fields`] iterator so the predicted size and the bytes
//! written cannot drift apart.

use crate::config::CodecConfig;
use crate::descriptor::{FieldKind, MessageDescriptor};
use crate::message::Message;
use crate::reader::WireReader;
use crate::unknown::UnknownField;
use crate::value::{FieldRef, Value};
use crate::wire::Tag;
use crate::writer::WireWriter;
use crate::{Result, WireError};
use bytes::Bytes;

/// Parses a complete record with the default [`CodecConfig`].
pub fn parse<M: Message + Default>(input: impl Into<Bytes>) -> Result<M> {
    parse_with_config(input, &CodecConfig::default())
}

pub fn parse_with_config<M: Message + Default>(
    input: impl Into<Bytes>,
    config: &CodecConfig,
) -> Result<M> {
    let mut message = M::default();
    parse_into(&mut message, input, config)?;
    Ok(message)
}

/// Parses `input` into an existing record.
///
/// The whole input is decoded before anything is stored, so a failure leaves
/// `message` exactly as it was.
///
/// # Errors
/// `DecodeAborted` carrying the record name, the offset of the field
/// occurrence that failed, and the underlying `TruncatedInput`,
/// `MalformedVarint`, `InvalidUtf8`, `InvalidWireType` or `InvalidTag`.
pub fn parse_into<M: Message>(
    message: &mut M,
    input: impl Into<Bytes>,
    config: &CodecConfig,
) -> Result<()> {
    let staged = decode_staged(message.descriptor(), input.into(), config)?;
    staged.apply(message)
}

/// Decoded fields waiting to be stored, in wire order.
#[derive(Debug, Default)]
struct Staged {
    values: Vec<(u32, Value)>,
    unknown: Vec<UnknownField>,
}

impl Staged {
    fn apply<M: Message>(self, message: &mut M) -> Result<()> {
        // Check every slot first so a record whose accessors disagree with
        // its descriptor is rejected before anything changes.
        for (number, value) in &self.values {
            check_slot(&*message, *number, value.kind())?;
        }
        // Later occurrences overwrite earlier ones.
        for (number, value) in self.values {
            let slot = message
                .field_mut(number)
                .ok_or(WireError::UnknownField(number))?;
            slot.assign(number, value)?;
        }
        let unknown = message.unknown_fields_mut();
        for field in self.unknown {
            unknown.push(field);
        }
        Ok(())
    }
}

/// Fails unless `message` has a slot of `kind` for field `number`.
fn check_slot<M: Message>(message: &M, number: u32, kind: FieldKind) -> Result<()> {
    match message.field(number) {
        Some(current) if current.kind() == kind => Ok(()),
        Some(current) => Err(WireError::FieldTypeMismatch {
            number,
            expected: current.kind(),
            actual: kind,
        }),
        None => Err(WireError::UnknownField(number)),
    }
}

fn decode_staged(
    descriptor: &MessageDescriptor,
    input: Bytes,
    config: &CodecConfig,
) -> Result<Staged> {
    let abort = |offset: usize, source: WireError| {
        log::debug!(
            "{}: decode aborted at offset {}: {}",
            descriptor.full_name(),
            offset,
            source
        );
        WireError::DecodeAborted {
            message: descriptor.full_name().to_string(),
            offset,
            source: Box::new(source),
        }
    };

    if input.len() > config.max_message_size {
        return Err(abort(
            0,
            WireError::MessageTooLarge {
                size: input.len(),
                limit: config.max_message_size,
            },
        ));
    }

    let mut reader = WireReader::new(input);
    let mut staged = Staged::default();
    while !reader.done() {
        let start = reader.position();
        let (tag, tag_bytes) = reader.read_tag_with_bytes().map_err(|e| abort(start, e))?;
        if tag.is_end_of_message() {
            log::trace!(
                "{}: end-of-message marker {} at offset {}",
                descriptor.full_name(),
                tag,
                start
            );
            break;
        }
        let number = tag.field_number();
        if number == 0 {
            return Err(abort(start, WireError::InvalidTag(tag.raw() as u64)));
        }
        let wire_type = tag.wire_type().map_err(|e| abort(start, e))?;

        match descriptor.field(number) {
            Some(field) if field.wire_type() == wire_type => {
                let value = Value::read(field, &mut reader).map_err(|e| abort(start, e))?;
                staged.values.push((number, value));
            }
            // Undeclared numbers and wire-type mismatches are kept opaque.
            _ => {
                let payload = reader
                    .read_raw_for_unknown(wire_type)
                    .map_err(|e| abort(start, e))?;
                if config.preserve_unknown_fields {
                    log::trace!(
                        "{}: keeping unknown field {} ({} bytes)",
                        descriptor.full_name(),
                        tag,
                        payload.len()
                    );
                    staged
                        .unknown
                        .push(UnknownField::with_wire_tag(tag, &tag_bytes, payload.to_vec()));
                }
            }
        }
    }
    Ok(staged)
}

/// Yields the tag and value of every declared field that is not at its
/// default, in ascending field-number order.
fn present_fields<'a, M: Message + 'a>(
    message: &'a M,
) -> impl Iterator<Item = Result<(Tag, FieldRef<'a>)>> + 'a {
    message
        .descriptor()
        .fields()
        .iter()
        .filter_map(move |field| match message.field(field.number()) {
            None => Some(Err(WireError::UnknownField(field.number()))),
            Some(value) if value.kind() != field.kind() => {
                Some(Err(WireError::FieldTypeMismatch {
                    number: field.number(),
                    expected: field.kind(),
                    actual: value.kind(),
                }))
            }
            Some(value) if value.is_default() => None,
            Some(value) => Some(Ok((Tag::new(field.number(), field.wire_type()), value))),
        })
}

/// Exact length of [`serialize`]'s output.
///
/// Fields whose accessor disagrees with the descriptor are not counted. For
/// such a record `serialize` fails, so the size is only meaningful when
/// serialization succeeds.
pub fn byte_size<M: Message>(message: &M) -> usize {
    let known: usize = present_fields(message)
        .filter_map(Result::ok)
        .map(|(tag, value)| tag.encoded_len() + value.encoded_len())
        .sum();
    known + message.unknown_fields().encoded_len()
}

/// Serializes into a buffer pre-sized by [`byte_size`].
pub fn serialize<M: Message>(message: &M) -> Result<Bytes> {
    let size = byte_size(message);
    let mut writer = WireWriter::with_capacity(size);
    serialize_to(message, &mut writer)?;
    debug_assert_eq!(writer.len(), size);
    Ok(writer.into_bytes())
}

/// Appends the encoded record to `writer`: non-default declared fields in
/// ascending number order, then the unknown fields in stored order.
///
/// # Errors
/// `UnknownField` or `FieldTypeMismatch` when the record's accessors disagree
/// with its descriptor. Bytes already appended are not rolled back.
pub fn serialize_to<M: Message>(message: &M, writer: &mut WireWriter) -> Result<()> {
    for entry in present_fields(message) {
        let (tag, value) = entry?;
        writer.write_tag(tag);
        value.write(writer);
    }
    message.unknown_fields().serialize_all(writer);
    Ok(())
}

/// Merges `src` into `dst`.
///
/// Each non-default scalar in `src` replaces the value in `dst`; `src`'s
/// unknown fields are appended after `dst`'s. Because `dst` is borrowed
/// mutably and `src` shared, a record can never be merged into itself.
///
/// Either every field is merged or, on error, `dst` is left unchanged.
///
/// # Errors
/// `DescriptorMismatch` if the two records are of different types.
/// `UnknownField` or `FieldTypeMismatch` if `src` holds a field that `dst`
/// cannot store.
pub fn merge<M: Message>(dst: &mut M, src: &M) -> Result<()> {
    if dst.descriptor().full_name() != src.descriptor().full_name() {
        return Err(WireError::DescriptorMismatch {
            expected: dst.descriptor().full_name().to_string(),
            actual: src.descriptor().full_name().to_string(),
        });
    }
    let present = present_fields(src).collect::<Result<Vec<_>>>()?;
    for (tag, value) in &present {
        check_slot(&*dst, tag.field_number(), value.kind())?;
    }
    for (tag, value) in present {
        let number = tag.field_number();
        let slot = dst
            .field_mut(number)
            .ok_or(WireError::UnknownField(number))?;
        slot.assign(number, value.to_value())?;
    }
    dst.unknown_fields_mut().merge_from(src.unknown_fields());
    Ok(())
}

/// Resets every declared field to its default and drops unknown fields.
pub fn clear<M: Message>(message: &mut M) {
    let count = message.descriptor().fields().len();
    for i in 0..count {
        let number = message.descriptor().fields()[i].number();
        if let Some(slot) = message.field_mut(number) {
            slot.reset();
        }
    }
    message.unknown_fields_mut().clear();
}

/// Independent deep copy of `message`.
pub fn copy<M: Message>(message: &M) -> M {
    message.clone()
}

/// Replaces `dst`'s contents with a copy of `src`'s.
pub fn copy_from<M: Message>(dst: &mut M, src: &M) -> Result<()> {
    clear(dst);
    merge(dst, src)
}
