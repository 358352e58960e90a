//! Outgoing datagram assembly.

use super::attribute::AttributeList;
use super::error::Result;
use super::genl::header::GenlMsgHdr;
use super::message::{NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};

/// Byte buffer for one outgoing netlink datagram.
///
/// The `nlmsg_len` field is rewritten after every append, so
/// [`as_bytes`](Self::as_bytes) is a complete datagram at any point.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    /// Start a datagram with an otherwise zeroed header.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        let header = NlMsgHdr::new(msg_type, flags);
        let mut buf = vec![0u8; NLMSG_HDRLEN];
        buf[..std::mem::size_of::<NlMsgHdr>()].copy_from_slice(header.as_bytes());
        let mut builder = Self { buf };
        builder.patch_len();
        builder
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True while only the header has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.len() == NLMSG_HDRLEN
    }

    /// Append `data`, zero-padded to the message alignment.
    pub fn append_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        self.buf.resize(nlmsg_align(self.buf.len()), 0);
        self.patch_len();
    }

    pub fn append_genl_header(&mut self, header: GenlMsgHdr) {
        self.append_bytes(header.as_bytes());
    }

    /// Serialize every attribute of `attributes` that holds a value.
    ///
    /// Nothing is appended if any attribute fails to encode.
    pub fn append_attributes(&mut self, attributes: &AttributeList) -> Result<()> {
        let start = self.buf.len();
        if let Err(e) = attributes.encode_into(&mut self.buf) {
            self.buf.truncate(start);
            return Err(e);
        }
        self.patch_len();
        Ok(())
    }

    pub fn set_seq(&mut self, seq: u32) {
        self.buf[8..12].copy_from_slice(&seq.to_ne_bytes());
    }

    pub fn set_pid(&mut self, pid: u32) {
        self.buf[12..16].copy_from_slice(&pid.to_ne_bytes());
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.patch_len();
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn patch_len(&mut self) {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_ne_bytes());
    }
}
