//! The 4-byte `genlmsghdr` that follows `nlmsghdr` in every generic
//! netlink datagram: command, version, two reserved bytes.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Mirrors `struct genlmsghdr`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct GenlMsgHdr {
    /// Family-specific command.
    pub cmd: u8,
    pub version: u8,
    pub reserved: u16,
}

pub const GENL_HDRLEN: usize = std::mem::size_of::<GenlMsgHdr>();

/// Version written into every outgoing generic header.
pub const GENL_VERSION: u8 = 1;

impl GenlMsgHdr {
    pub const fn new(cmd: u8, version: u8) -> Self {
        Self {
            cmd,
            version,
            reserved: 0,
        }
    }

    /// `None` if fewer than [`GENL_HDRLEN`] bytes are available.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        Self::read_from_prefix(data).ok().map(|(hdr, _)| hdr)
    }

    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }
}
