//! Raw `nlattr` TLV headers and payload accessors.
//!
//! Typed attribute lists are built on top of this in
//! [`attribute`](super::attribute).

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const NLA_ALIGNTO: usize = 4;

/// Round `len` up to the attribute alignment.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

pub const NLA_HDRLEN: usize = 4;

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Header for a payload of `data_len` bytes.
    ///
    /// Fails when header plus payload does not fit the 16-bit length field.
    pub fn new(attr_type: u16, data_len: usize) -> Result<Self> {
        Ok(Self {
            nla_len: checked_len(attr_type, NLA_HDRLEN + data_len)?,
            nla_type: attr_type,
        })
    }

    /// Type with the nested and byte-order flags masked off.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

fn checked_len(attr_type: u16, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| {
        Error::InvalidAttribute(format!(
            "attribute {} is {} bytes, over the {} byte limit",
            attr_type & NLA_TYPE_MASK,
            len,
            u16::MAX
        ))
    })
}

/// Append one attribute (header, payload, padding) to `buf`.
///
/// `buf` is left untouched if the attribute is too long to encode.
pub fn put(buf: &mut Vec<u8>, attr_type: u16, data: &[u8]) -> Result<()> {
    let attr = NlAttr::new(attr_type, data.len())?;
    buf.extend_from_slice(attr.as_bytes());
    buf.extend_from_slice(data);
    buf.resize(nla_align(buf.len()), 0);
    Ok(())
}

/// Write a placeholder header for a nested attribute.
///
/// Returns the header offset to hand to [`nest_end`].
pub fn nest_start(buf: &mut Vec<u8>, attr_type: u16) -> usize {
    let offset = buf.len();
    let header = NlAttr {
        nla_len: NLA_HDRLEN as u16,
        nla_type: attr_type,
    };
    buf.extend_from_slice(header.as_bytes());
    offset
}

/// Back-patch the length of a nested attribute once its children are written.
///
/// If the children overflow the length field the whole nest is dropped from
/// `buf` and an error is returned.
pub fn nest_end(buf: &mut Vec<u8>, offset: usize) -> Result<()> {
    let header = NlAttr::from_bytes(&buf[offset..])?;
    let len = match checked_len(header.nla_type, buf.len() - offset) {
        Ok(len) => len,
        Err(e) => {
            buf.truncate(offset);
            return Err(e);
        }
    };
    buf[offset..offset + 2].copy_from_slice(&len.to_ne_bytes());
    buf.resize(nla_align(buf.len()), 0);
    Ok(())
}

/// Iterator over netlink attributes in a buffer.
///
/// Iteration stops at the first header that is short or claims more bytes
/// than remain; [`AttrIter::remaining`] reports what was left unparsed.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl<'a> Iterator for AttrIter<'a> {
    /// Returns (attribute type, payload data).
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLA_HDRLEN {
            return None;
        }

        let attr = NlAttr::from_bytes(self.data).ok()?;

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN || len > self.data.len() {
            return None;
        }

        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len);

        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some((attr.kind(), payload))
    }
}

/// Typed reads of attribute payloads. Integers are host byte order.
pub mod get {
    use super::*;

    pub fn u8(data: &[u8]) -> Result<u8> {
        data.first()
            .copied()
            .ok_or_else(|| Error::InvalidAttribute("empty u8 attribute".into()))
    }

    pub fn u16_ne(data: &[u8]) -> Result<u16> {
        if data.len() < 2 {
            return Err(Error::InvalidAttribute("truncated u16 attribute".into()));
        }
        Ok(u16::from_ne_bytes([data[0], data[1]]))
    }

    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        if data.len() < 4 {
            return Err(Error::InvalidAttribute("truncated u32 attribute".into()));
        }
        Ok(u32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
    }

    pub fn u64_ne(data: &[u8]) -> Result<u64> {
        if data.len() < 8 {
            return Err(Error::InvalidAttribute("truncated u64 attribute".into()));
        }
        Ok(u64::from_ne_bytes([
            data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
        ]))
    }

    /// Payload up to the first NUL.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected;
    /// SSIDs and interface names are not guaranteed to be UTF-8.
    pub fn string(data: &[u8]) -> String {
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        String::from_utf8_lossy(&data[..len]).into_owned()
    }

    /// Extract an i32 value (native endian).
    pub fn i32_ne(data: &[u8]) -> Result<i32> {
        if data.len() < 4 {
            return Err(Error::InvalidAttribute("truncated i32 attribute".into()));
        }
        Ok(i32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
    }
}
