use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
use crate::message::Message;
use crate::unknown::UnknownFieldStore;
use crate::value::{FieldMut, FieldRef};

static EXAMPLE_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new(Example::STR_FIELD_NUMBER, "str", FieldKind::String),
    FieldDescriptor::new(Example::I32_FIELD_NUMBER, "i32", FieldKind::Int32),
];

static EXAMPLE_DESCRIPTOR: MessageDescriptor = MessageDescriptor::new("pkg.Example", &EXAMPLE_FIELDS);

/// The `pkg.Example` record:
///
/// ```text
/// message Example {
///   string str = 1;
///   int32 i32 = 2;
/// }
/// ```
///
/// Written out by hand the way `#[derive(Message)]` would expand it.
/// `Example::default()` is the all-defaults record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Example {
    pub str: String,
    pub i32: i32,
    pub unknown: UnknownFieldStore,
}

impl Example {
    pub const STR_FIELD_NUMBER: u32 = 1;
    pub const I32_FIELD_NUMBER: u32 = 2;

    pub fn new(str: impl Into<String>, i32: i32) -> Self {
        Self {
            str: str.into(),
            i32,
            unknown: UnknownFieldStore::new(),
        }
    }

    pub fn static_descriptor() -> &'static MessageDescriptor {
        &EXAMPLE_DESCRIPTOR
    }
}

impl Message for Example {
    fn descriptor(&self) -> &MessageDescriptor {
        &EXAMPLE_DESCRIPTOR
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        match number {
            Self::STR_FIELD_NUMBER => Some(FieldRef::String(&self.str)),
            Self::I32_FIELD_NUMBER => Some(FieldRef::Int32(self.i32)),
            _ => None,
        }
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        match number {
            Self::STR_FIELD_NUMBER => Some(FieldMut::String(&mut self.str)),
            Self::I32_FIELD_NUMBER => Some(FieldMut::Int32(&mut self.i32)),
            _ => None,
        }
    }

    fn unknown_fields(&self) -> &UnknownFieldStore {
        &self.unknown
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldStore {
        &mut self.unknown
    }
}
