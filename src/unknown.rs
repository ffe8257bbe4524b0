use crate::wire::Tag;
use crate::writer::WireWriter;

/// One captured field occurrence: its tag and the raw bytes that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownField {
    pub tag: Tag,
    pub payload: Vec<u8>,
    /// Tag bytes as they arrived, kept only when they were not the minimal
    /// encoding of `tag`.
    wire_tag: Option<Vec<u8>>,
}

impl UnknownField {
    pub fn new(tag: Tag, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            payload: payload.into(),
            wire_tag: None,
        }
    }

    /// Captures an occurrence together with the tag bytes read for it, so
    /// that a padded tag varint is written back unchanged.
    pub fn with_wire_tag(tag: Tag, wire_tag: &[u8], payload: impl Into<Vec<u8>>) -> Self {
        let wire_tag = (wire_tag.len() != tag.encoded_len()).then(|| wire_tag.to_vec());
        Self {
            tag,
            payload: payload.into(),
            wire_tag,
        }
    }

    /// The tag bytes as received, when they were not minimally encoded.
    pub fn tag_bytes(&self) -> Option<&[u8]> {
        self.wire_tag.as_deref()
    }

    #[inline]
    pub fn encoded_len(&self) -> usize {
        let tag_len = match &self.wire_tag {
            Some(raw) => raw.len(),
            None => self.tag.encoded_len(),
        };
        tag_len + self.payload.len()
    }

    fn write(&self, writer: &mut WireWriter) {
        match &self.wire_tag {
            Some(raw) => writer.write_raw(raw),
            None => writer.write_tag(self.tag),
        }
        writer.write_raw(&self.payload);
    }
}

/// Fields a decoder did not recognize, kept in arrival order so they can be
/// written back unchanged.
///
/// Entries are never deduplicated or interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnknownFieldStore {
    fields: Vec<UnknownField>,
}

impl UnknownFieldStore {
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn append(&mut self, tag: Tag, payload: impl Into<Vec<u8>>) {
        self.fields.push(UnknownField::new(tag, payload));
    }

    pub fn push(&mut self, field: UnknownField) {
        self.fields.push(field);
    }

    /// Appends copies of `other`'s entries after this store's own.
    pub fn merge_from(&mut self, other: &UnknownFieldStore) {
        self.fields.extend_from_slice(&other.fields);
    }

    /// Re-emits every entry, tag then payload, in stored order.
    pub fn serialize_all(&self, writer: &mut WireWriter) {
        for field in &self.fields {
            field.write(writer);
        }
    }

    /// Exact number of bytes [`serialize_all`](Self::serialize_all) writes.
    pub fn encoded_len(&self) -> usize {
        self.fields.iter().map(UnknownField::encoded_len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnknownField> {
        self.fields.iter()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl<'a> IntoIterator for &'a UnknownFieldStore {
    type Item = &'a UnknownField;
    type IntoIter = std::slice::Iter<'a, UnknownField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
