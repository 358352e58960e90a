//! Typed attribute trees.
//!
//! An [`AttributeList`] maps attribute ids to typed [`Attribute`] slots. A
//! slot must be created (fixing its type) before it can be set, and whether
//! it holds a value is tracked separately from whether it exists. This lets
//! a caller create a nested attribute, populate its child list, and only
//! then mark it complete:
//!
//! ```
//! use nlmux::netlink::attribute::AttributeList;
//!
//! let mut attrs = AttributeList::new();
//! attrs.create_nested(7, "GROUP");
//! if let Some(group) = attrs.get_nested_mut(7) {
//!     group.create::<String>(1, "NAME");
//!     group.set(1, "scan".to_string());
//! }
//! attrs.set_nested_has_value(7);
//!
//! let bytes = attrs.encode()?;
//! assert_eq!(bytes.len(), 4 + 4 + 8);
//! # Ok::<(), nlmux::Error>(())
//! ```
//!
//! Encoding walks the list in ascending id order and emits one TLV per
//! attribute that has a value. Decoding is driven by a [`NestedSchema`];
//! attributes the schema does not declare survive as [`AttributeValue::Raw`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use super::attr::{self, AttrIter, get};
use super::error::Result;
use super::schema::{AttrKind, AttrSpec, NestedSchema};

/// Payload of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Flag(bool),
    String(String),
    Nested(AttributeList),
    Raw(Vec<u8>),
}

impl AttributeValue {
    /// An empty value of the given kind.
    pub fn empty(kind: AttrKind) -> Self {
        match kind {
            AttrKind::U8 => AttributeValue::U8(0),
            AttrKind::U16 => AttributeValue::U16(0),
            AttrKind::U32 => AttributeValue::U32(0),
            AttrKind::U64 => AttributeValue::U64(0),
            AttrKind::Flag => AttributeValue::Flag(false),
            AttrKind::String => AttributeValue::String(String::new()),
            AttrKind::Nested => AttributeValue::Nested(AttributeList::new()),
            AttrKind::Raw => AttributeValue::Raw(Vec::new()),
        }
    }

    /// The kind of this value.
    pub fn kind(&self) -> AttrKind {
        match self {
            AttributeValue::U8(_) => AttrKind::U8,
            AttributeValue::U16(_) => AttrKind::U16,
            AttributeValue::U32(_) => AttrKind::U32,
            AttributeValue::U64(_) => AttrKind::U64,
            AttributeValue::Flag(_) => AttrKind::Flag,
            AttributeValue::String(_) => AttrKind::String,
            AttributeValue::Nested(_) => AttrKind::Nested,
            AttributeValue::Raw(_) => AttrKind::Raw,
        }
    }
}

/// Rust types that can be stored in an attribute slot.
pub trait AttributeType: Sized {
    /// Slot kind this type maps to.
    const KIND: AttrKind;

    /// Wrap the value.
    fn into_value(self) -> AttributeValue;

    /// Extract a copy of the value if `value` holds this type.
    fn from_value(value: &AttributeValue) -> Option<Self>;
}

macro_rules! impl_attribute_type {
    ($ty:ty, $kind:ident) => {
        impl AttributeType for $ty {
            const KIND: AttrKind = AttrKind::$kind;

            fn into_value(self) -> AttributeValue {
                AttributeValue::$kind(self)
            }

            fn from_value(value: &AttributeValue) -> Option<Self> {
                match value {
                    AttributeValue::$kind(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_attribute_type!(u8, U8);
impl_attribute_type!(u16, U16);
impl_attribute_type!(u32, U32);
impl_attribute_type!(u64, U64);
impl_attribute_type!(bool, Flag);
impl_attribute_type!(String, String);
impl_attribute_type!(AttributeList, Nested);
impl_attribute_type!(Vec<u8>, Raw);

/// A single typed attribute slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    id: u16,
    name: Cow<'static, str>,
    has_value: bool,
    value: AttributeValue,
}

impl Attribute {
    fn empty(id: u16, name: Cow<'static, str>, kind: AttrKind) -> Self {
        Self {
            id,
            name,
            has_value: false,
            value: AttributeValue::empty(kind),
        }
    }

    fn with_value(id: u16, name: Cow<'static, str>, value: AttributeValue) -> Self {
        Self {
            id,
            name,
            has_value: true,
            value,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttrKind {
        self.value.kind()
    }

    pub fn has_value(&self) -> bool {
        self.has_value
    }

    /// The stored value, or `None` while the slot is unset.
    pub fn value(&self) -> Option<&AttributeValue> {
        self.has_value.then_some(&self.value)
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        if !self.has_value {
            return Ok(());
        }
        match &self.value {
            AttributeValue::U8(v) => attr::put(buf, self.id, &[*v]),
            AttributeValue::U16(v) => attr::put(buf, self.id, &v.to_ne_bytes()),
            AttributeValue::U32(v) => attr::put(buf, self.id, &v.to_ne_bytes()),
            AttributeValue::U64(v) => attr::put(buf, self.id, &v.to_ne_bytes()),
            AttributeValue::Flag(true) => attr::put(buf, self.id, &[]),
            AttributeValue::Flag(false) => Ok(()),
            AttributeValue::String(s) => {
                let mut data = Vec::with_capacity(s.len() + 1);
                data.extend_from_slice(s.as_bytes());
                data.push(0);
                attr::put(buf, self.id, &data)
            }
            AttributeValue::Nested(list) => {
                let nest = attr::nest_start(buf, self.id);
                if let Err(e) = list.encode_into(buf) {
                    buf.truncate(nest);
                    return Err(e);
                }
                attr::nest_end(buf, nest)
            }
            AttributeValue::Raw(data) => attr::put(buf, self.id, data),
        }
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        if !self.has_value {
            return f.write_str("<unset>");
        }
        match &self.value {
            AttributeValue::U8(v) => write!(f, "{v}"),
            AttributeValue::U16(v) => write!(f, "{v}"),
            AttributeValue::U32(v) => write!(f, "{v}"),
            AttributeValue::U64(v) => write!(f, "{v}"),
            AttributeValue::Flag(v) => write!(f, "{v}"),
            AttributeValue::String(s) => write!(f, "'{s}'"),
            AttributeValue::Raw(data) => f.write_str(&hex_string(data)),
            AttributeValue::Nested(list) => {
                f.write_str("{")?;
                list.fmt_indented(f, indent + 1)?;
                write!(f, "\n{:width$}}}", "", width = indent * 2)
            }
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: ", self.name, self.kind().name())?;
        self.fmt_value(f, 0)
    }
}

/// Render bytes as `N bytes: 0x.. 0x..`.
pub fn hex_string(data: &[u8]) -> String {
    let mut out = format!("{} bytes:", data.len());
    for byte in data {
        let _ = write!(out, " 0x{byte:02x}");
    }
    out
}

/// Attributes keyed by id, iterated in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList {
    attributes: BTreeMap<u16, Attribute>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Whether a slot exists for `id` (set or not).
    pub fn contains(&self, id: u16) -> bool {
        self.attributes.contains_key(&id)
    }

    /// The slot for `id`.
    pub fn attribute(&self, id: u16) -> Option<&Attribute> {
        self.attributes.get(&id)
    }

    /// Iterate over slots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Create an empty slot of the given kind.
    ///
    /// Creating an id that already exists leaves the existing slot and its
    /// value untouched. Returns `false` only if the existing slot has a
    /// different kind.
    pub fn create_kind(
        &mut self,
        id: u16,
        name: impl Into<Cow<'static, str>>,
        kind: AttrKind,
    ) -> bool {
        if let Some(existing) = self.attributes.get(&id) {
            if existing.kind() != kind {
                tracing::warn!(
                    id,
                    existing = existing.kind().name(),
                    requested = kind.name(),
                    "attribute already exists with a different type"
                );
                return false;
            }
            return true;
        }
        self.attributes
            .insert(id, Attribute::empty(id, name.into(), kind));
        true
    }

    /// Create an empty slot of type `T`. See [`create_kind`](Self::create_kind).
    pub fn create<T: AttributeType>(&mut self, id: u16, name: impl Into<Cow<'static, str>>) -> bool {
        self.create_kind(id, name, T::KIND)
    }

    /// Create an empty slot described by a schema entry.
    pub fn create_from(&mut self, spec: &AttrSpec) -> bool {
        self.create_kind(spec.id, spec.name, spec.kind)
    }

    /// Create an empty nested slot.
    pub fn create_nested(&mut self, id: u16, name: impl Into<Cow<'static, str>>) -> bool {
        self.create_kind(id, name, AttrKind::Nested)
    }

    /// Get a copy of the value at `id`.
    ///
    /// Returns `None` if the slot is absent, holds another type, or is unset.
    pub fn get<T: AttributeType>(&self, id: u16) -> Option<T> {
        self.attributes
            .get(&id)
            .and_then(Attribute::value)
            .and_then(T::from_value)
    }

    /// Set the value at `id`. Fails if the slot was not created or has
    /// another type.
    pub fn set<T: AttributeType>(&mut self, id: u16, value: T) -> bool {
        let Some(slot) = self.attributes.get_mut(&id) else {
            tracing::warn!(id, "cannot set attribute that was not created");
            return false;
        };
        if slot.kind() != T::KIND {
            tracing::warn!(
                id,
                name = %slot.name,
                expected = slot.kind().name(),
                got = T::KIND.name(),
                "attribute type mismatch"
            );
            return false;
        }
        slot.value = value.into_value();
        slot.has_value = true;
        true
    }

    /// Borrow a string value.
    pub fn get_str(&self, id: u16) -> Option<&str> {
        match self.attributes.get(&id).and_then(Attribute::value)? {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow a raw value.
    pub fn get_raw(&self, id: u16) -> Option<&[u8]> {
        match self.attributes.get(&id).and_then(Attribute::value)? {
            AttributeValue::Raw(data) => Some(data),
            _ => None,
        }
    }

    /// Flag value, treating an absent or unset flag as `false`.
    pub fn flag(&self, id: u16) -> bool {
        self.get::<bool>(id).unwrap_or(false)
    }

    /// Borrow a completed nested list.
    pub fn get_nested(&self, id: u16) -> Option<&AttributeList> {
        match self.attributes.get(&id).and_then(Attribute::value)? {
            AttributeValue::Nested(list) => Some(list),
            _ => None,
        }
    }

    /// Borrow a nested list for populating, whether or not it is marked
    /// complete yet.
    pub fn get_nested_mut(&mut self, id: u16) -> Option<&mut AttributeList> {
        match &mut self.attributes.get_mut(&id)?.value {
            AttributeValue::Nested(list) => Some(list),
            _ => None,
        }
    }

    /// Mark a nested slot as holding a value.
    pub fn set_nested_has_value(&mut self, id: u16) -> bool {
        match self.attributes.get_mut(&id) {
            Some(slot) if slot.kind() == AttrKind::Nested => {
                slot.has_value = true;
                true
            }
            _ => false,
        }
    }

    /// Serialize every attribute that has a value.
    ///
    /// Fails if any attribute, nested ones included, is longer than a
    /// netlink attribute length can express.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Serialize into an existing buffer.
    ///
    /// On error `buf` may hold the attributes that encoded before the
    /// failing one.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        for attribute in self.attributes.values() {
            attribute.encode_into(buf)?;
        }
        Ok(())
    }

    /// Parse sibling attributes according to `schema`.
    pub fn decode(data: &[u8], schema: &NestedSchema) -> Self {
        let array = schema.is_array();
        Self::decode_with(data, array, |id| schema.lookup(id))
    }

    /// Parse sibling attributes, resolving each id through `lookup`.
    ///
    /// In `array` mode every element is named `{template}_{id}`.
    pub fn decode_with<'s>(
        data: &[u8],
        array: bool,
        lookup: impl Fn(u16) -> Option<&'s AttrSpec>,
    ) -> Self {
        let mut list = Self::new();
        let mut iter = AttrIter::new(data);
        for (id, payload) in iter.by_ref() {
            match lookup(id) {
                Some(spec) => {
                    let name: Cow<'static, str> = if array {
                        Cow::Owned(format!("{}_{}", spec.name, id))
                    } else {
                        Cow::Borrowed(spec.name)
                    };
                    list.decode_child(id, name, spec, payload);
                }
                None => list.insert_raw(id, payload),
            }
        }
        if iter.remaining() > 0 {
            tracing::warn!(
                remaining = iter.remaining(),
                "ignoring malformed trailing attribute bytes"
            );
        }
        list
    }

    fn insert_raw(&mut self, id: u16, payload: &[u8]) {
        let name = Cow::Owned(format!("<UNKNOWN ATTRIBUTE {id}>"));
        self.attributes.insert(
            id,
            Attribute::with_value(id, name, AttributeValue::Raw(payload.to_vec())),
        );
    }

    fn decode_child(&mut self, id: u16, name: Cow<'static, str>, spec: &AttrSpec, payload: &[u8]) {
        if let Some(parser) = spec.parser {
            if !parser(self, id, &name, payload) {
                tracing::warn!(%name, id, "custom attribute parser failed");
            }
            return;
        }
        if !spec.accepts(payload) {
            tracing::error!(
                %name,
                id,
                len = payload.len(),
                kind = spec.kind.name(),
                "discarding attribute too short for its type"
            );
            return;
        }
        let value = match spec.kind {
            AttrKind::U8 => get::u8(payload).map(AttributeValue::U8),
            AttrKind::U16 => get::u16_ne(payload).map(AttributeValue::U16),
            AttrKind::U32 => get::u32_ne(payload).map(AttributeValue::U32),
            AttrKind::U64 => get::u64_ne(payload).map(AttributeValue::U64),
            AttrKind::Flag => Ok(AttributeValue::Flag(true)),
            AttrKind::String => Ok(AttributeValue::String(get::string(payload))),
            AttrKind::Raw => Ok(AttributeValue::Raw(payload.to_vec())),
            AttrKind::Nested => Ok(match spec.nested {
                Some(schema) => AttributeValue::Nested(Self::decode(payload, schema)),
                None => {
                    tracing::debug!(%name, id, "no nested schema, keeping raw bytes");
                    AttributeValue::Raw(payload.to_vec())
                }
            }),
        };
        match value {
            Ok(value) => {
                self.attributes
                    .insert(id, Attribute::with_value(id, name, value));
            }
            Err(e) => tracing::error!(%name, id, error = %e, "discarding attribute"),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for attribute in self.attributes.values() {
            write!(
                f,
                "\n{:width$}{} {}: ",
                "",
                attribute.name,
                attribute.kind().name(),
                width = indent * 2
            )?;
            attribute.fmt_value(f, indent)?;
        }
        Ok(())
    }
}

impl fmt::Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 1)
    }
}
