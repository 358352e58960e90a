//! Static attribute schemas.
//!
//! A schema tells the decoder how to interpret the children of one level of
//! an attribute tree. Families describe their attribute space as `static`
//! tables of [`AttrSpec`] so that decoding never allocates a schema.
//!
//! Two shapes exist:
//!
//! - [`NestedSchema::Structure`]: a fixed set of named children matched by id.
//! - [`NestedSchema::Array`]: any number of children sharing one template;
//!   the id of each element is whatever index the kernel wrote.

use super::attribute::AttributeList;

/// Primitive type of an attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    U8,
    U16,
    U32,
    U64,
    /// Presence-only attribute with an empty payload.
    Flag,
    /// NUL-terminated string.
    String,
    /// Child attribute list.
    Nested,
    /// Uninterpreted bytes.
    Raw,
}

impl AttrKind {
    /// Smallest payload that can hold a value of this kind.
    pub const fn min_len(self) -> usize {
        match self {
            AttrKind::U8 => 1,
            AttrKind::U16 => 2,
            AttrKind::U32 => 4,
            AttrKind::U64 => 8,
            AttrKind::Flag | AttrKind::String | AttrKind::Nested | AttrKind::Raw => 0,
        }
    }

    /// Type name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            AttrKind::U8 => "uint8_t",
            AttrKind::U16 => "uint16_t",
            AttrKind::U32 => "uint32_t",
            AttrKind::U64 => "uint64_t",
            AttrKind::Flag => "flag",
            AttrKind::String => "string",
            AttrKind::Nested => "nested",
            AttrKind::Raw => "<raw>",
        }
    }
}

/// Hook that parses an attribute payload into `list` itself.
///
/// Receives the target list, the attribute id, its name and the payload.
/// Returns `false` if the payload could not be parsed.
pub type CustomParser = fn(&mut AttributeList, u16, &str, &[u8]) -> bool;

/// Declaration of a single attribute: id, name, type and how to go deeper.
#[derive(Debug, Clone, Copy)]
pub struct AttrSpec {
    pub id: u16,
    pub name: &'static str,
    pub kind: AttrKind,
    /// Schema for the children of a nested attribute.
    pub nested: Option<&'static NestedSchema>,
    /// Replaces the default decoding of this attribute.
    pub parser: Option<CustomParser>,
}

impl AttrSpec {
    /// A primitive (non-nested) attribute.
    pub const fn new(id: u16, name: &'static str, kind: AttrKind) -> Self {
        Self {
            id,
            name,
            kind,
            nested: None,
            parser: None,
        }
    }

    /// A nested attribute whose children follow `schema`.
    pub const fn nested(id: u16, name: &'static str, schema: &'static NestedSchema) -> Self {
        Self {
            id,
            name,
            kind: AttrKind::Nested,
            nested: Some(schema),
            parser: None,
        }
    }

    /// An attribute decoded by a custom hook.
    pub const fn custom(id: u16, name: &'static str, parser: CustomParser) -> Self {
        Self {
            id,
            name,
            kind: AttrKind::Nested,
            nested: None,
            parser: Some(parser),
        }
    }

    /// Whether `payload` is long enough for this attribute's type.
    pub fn accepts(&self, payload: &[u8]) -> bool {
        payload.len() >= self.kind.min_len()
    }
}

/// Schema for one level of nesting.
#[derive(Debug)]
pub enum NestedSchema {
    /// Every child uses the same template; its `id` is ignored.
    Array(AttrSpec),
    /// Children are matched by id against the declared entries.
    Structure(&'static [AttrSpec]),
}

impl NestedSchema {
    /// Find the declaration for a child with the given id.
    pub fn lookup(&self, id: u16) -> Option<&AttrSpec> {
        match self {
            NestedSchema::Array(template) => Some(template),
            NestedSchema::Structure(specs) => specs.iter().find(|spec| spec.id == id),
        }
    }

    /// Whether this is an array schema.
    pub fn is_array(&self) -> bool {
        matches!(self, NestedSchema::Array(_))
    }
}
