//! Netlink message header, framing and decoding.
//!
//! Every datagram starts with a 16-byte [`NlMsgHdr`]. The four reserved
//! types (NOOP, ERROR, DONE, OVERRUN) are protocol-level pseudo-messages;
//! every other type is a family id and is decoded by whatever decoder the
//! [`MessageFactory`] has registered for it.

use std::collections::HashMap;
use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::attr::get;
use super::attribute::AttributeList;
use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::genl::control::{self, ControlMessage};
use super::genl::header::{GENL_HDRLEN, GENL_VERSION, GenlMsgHdr};
use super::genl::nl80211::Nl80211Message;

/// Netlink message header alignment.
pub const NLMSG_ALIGNTO: usize = 4;

/// Align a length to NLMSG_ALIGNTO boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<NlMsgHdr>());

/// Message type of a message whose family id is not known yet.
pub const ILLEGAL_MESSAGE_TYPE: u16 = 0;

/// Sequence number of unsolicited messages. Never assigned to a request.
pub const BROADCAST_SEQUENCE: u32 = 0;

/// Netlink message header (mirrors struct nlmsghdr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgHdr {
    /// Length of message including header.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Additional flags.
    pub nlmsg_flags: u16,
    /// Sequence number.
    pub nlmsg_seq: u32,
    /// Sending process port ID.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Create a new message header.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            nlmsg_seq: 0,
            nlmsg_pid: 0,
        }
    }

    /// Convert header to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse header from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// Standard netlink message types.
pub struct NlMsgType;

impl NlMsgType {
    /// No operation, message must be discarded.
    pub const NOOP: u16 = 1;
    /// Error message or ACK.
    pub const ERROR: u16 = 2;
    /// End of multipart message.
    pub const DONE: u16 = 3;
    /// Data lost, request resend.
    pub const OVERRUN: u16 = 4;
}

/// Netlink message flags.
pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_MULTI: u16 = 0x02;
pub const NLM_F_ACK: u16 = 0x04;
pub const NLM_F_ECHO: u16 = 0x08;
pub const NLM_F_DUMP_INTR: u16 = 0x10;
pub const NLM_F_DUMP_FILTERED: u16 = 0x20;

// Modifiers to GET request
pub const NLM_F_ROOT: u16 = 0x100;
pub const NLM_F_MATCH: u16 = 0x200;
pub const NLM_F_ATOMIC: u16 = 0x400;
pub const NLM_F_DUMP: u16 = NLM_F_ROOT | NLM_F_MATCH;

/// Decoded outer header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Family id or one of the [`NlMsgType`] constants.
    pub message_type: u16,
    pub flags: u16,
    pub sequence_number: u32,
    pub pid: u32,
}

impl MessageHeader {
    /// Header for an outgoing request of the given type.
    pub fn request(message_type: u16) -> Self {
        Self {
            message_type,
            flags: NLM_F_REQUEST,
            sequence_number: BROADCAST_SEQUENCE,
            pid: 0,
        }
    }

    /// Whether the MULTI flag is set.
    pub fn is_multi(&self) -> bool {
        self.flags & NLM_F_MULTI != 0
    }
}

impl From<&NlMsgHdr> for MessageHeader {
    fn from(hdr: &NlMsgHdr) -> Self {
        Self {
            message_type: hdr.nlmsg_type,
            flags: hdr.nlmsg_flags,
            sequence_number: hdr.nlmsg_seq,
            pid: hdr.nlmsg_pid,
        }
    }
}

/// A generic netlink message: outer header, command byte and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericNetlinkMessage {
    pub header: MessageHeader,
    pub command: u8,
    pub attributes: AttributeList,
}

impl GenericNetlinkMessage {
    /// An empty request for `command` in family `message_type`.
    pub fn new(message_type: u16, command: u8) -> Self {
        Self {
            header: MessageHeader::request(message_type),
            command,
            attributes: AttributeList::new(),
        }
    }

    pub fn message_type(&self) -> u16 {
        self.header.message_type
    }

    pub fn set_message_type(&mut self, message_type: u16) {
        self.header.message_type = message_type;
    }

    pub fn flags(&self) -> u16 {
        self.header.flags
    }

    /// OR a flag into the header.
    pub fn add_flag(&mut self, flag: u16) {
        self.header.flags |= flag;
    }

    pub fn sequence_number(&self) -> u32 {
        self.header.sequence_number
    }

    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeList {
        &mut self.attributes
    }

    /// Serialize with sequence number `seq`, recording it on the message.
    ///
    /// Fails if `seq` is the broadcast sequence number or the family id has
    /// not been set.
    pub fn encode(&mut self, seq: u32) -> Result<Vec<u8>> {
        if seq == BROADCAST_SEQUENCE {
            return Err(Error::InvalidSequence);
        }
        if self.header.message_type == ILLEGAL_MESSAGE_TYPE {
            return Err(Error::IllegalMessageType);
        }
        self.header.sequence_number = seq;

        let mut builder = MessageBuilder::new(self.header.message_type, self.header.flags);
        builder.set_seq(seq);
        builder.set_pid(self.header.pid);
        builder.append_genl_header(GenlMsgHdr::new(self.command, GENL_VERSION));
        builder.append_attributes(&self.attributes)?;
        Ok(builder.finish())
    }

    /// Split a generic payload into its command byte and attribute bytes.
    pub fn split_payload(payload: &[u8]) -> Result<(GenlMsgHdr, &[u8])> {
        let genl = GenlMsgHdr::from_bytes(payload).ok_or(Error::Truncated {
            expected: GENL_HDRLEN,
            actual: payload.len(),
        })?;
        Ok((genl, &payload[GENL_HDRLEN..]))
    }
}

/// Netlink error message payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
pub struct NlMsgError {
    /// Error code (negative errno or 0 for ACK).
    pub error: i32,
    /// Original message header that caused the error.
    pub msg: NlMsgHdr,
}

/// NLMSG_ERROR: an ACK (code 0) or a kernel error (negative errno).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAckMessage {
    pub header: MessageHeader,
    /// Negative errno, or 0 for an ACK.
    pub error: i32,
    /// Header of the request being answered, when the kernel echoed it.
    pub request: Option<MessageHeader>,
}

impl ErrorAckMessage {
    fn decode(header: MessageHeader, payload: &[u8]) -> Result<Self> {
        let error = get::i32_ne(payload).map_err(|_| Error::Truncated {
            expected: 4,
            actual: payload.len(),
        })?;
        let request = NlMsgError::read_from_prefix(payload)
            .ok()
            .map(|(err, _)| MessageHeader::from(&err.msg));
        Ok(Self {
            header,
            error,
            request,
        })
    }

    /// Whether this is an ACK rather than an error.
    pub fn is_ack(&self) -> bool {
        self.error == 0
    }

    /// The kernel error as an [`Error`], or `None` for an ACK.
    pub fn to_error(&self) -> Option<Error> {
        (!self.is_ack()).then(|| Error::from_errno(self.error))
    }
}

impl fmt::Display for ErrorAckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_error() {
            None => f.write_str("ACK"),
            Some(err) => write!(f, "NLMSG_ERROR {}: {}", -self.error, err),
        }
    }
}

/// A message of a family no decoder is registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

/// [`Decoder`] that keeps the payload as opaque bytes.
///
/// Useful when resolving a family this crate has no schema for.
pub fn decode_opaque(header: MessageHeader, payload: &[u8]) -> Result<NetlinkMessage> {
    Ok(NetlinkMessage::Unknown(UnknownMessage {
        header,
        payload: payload.to_vec(),
    }))
}

/// Any message that can arrive on the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum NetlinkMessage {
    ErrorAck(ErrorAckMessage),
    Noop(MessageHeader),
    Done(MessageHeader),
    Overrun(MessageHeader),
    Control(ControlMessage),
    Nl80211(Nl80211Message),
    Unknown(UnknownMessage),
}

impl NetlinkMessage {
    pub fn header(&self) -> &MessageHeader {
        match self {
            NetlinkMessage::ErrorAck(msg) => &msg.header,
            NetlinkMessage::Noop(header)
            | NetlinkMessage::Done(header)
            | NetlinkMessage::Overrun(header) => header,
            NetlinkMessage::Control(msg) => &msg.header,
            NetlinkMessage::Nl80211(msg) => &msg.header,
            NetlinkMessage::Unknown(msg) => &msg.header,
        }
    }

    pub fn message_type(&self) -> u16 {
        self.header().message_type
    }

    pub fn flags(&self) -> u16 {
        self.header().flags
    }

    pub fn sequence_number(&self) -> u32 {
        self.header().sequence_number
    }

    pub fn is_multi(&self) -> bool {
        self.header().is_multi()
    }

    /// Short name of the message kind, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NetlinkMessage::ErrorAck(msg) if msg.is_ack() => "ACK",
            NetlinkMessage::ErrorAck(_) => "NLMSG_ERROR",
            NetlinkMessage::Noop(_) => "NLMSG_NOOP",
            NetlinkMessage::Done(_) => "NLMSG_DONE",
            NetlinkMessage::Overrun(_) => "NLMSG_OVERRUN",
            NetlinkMessage::Control(_) => "Control",
            NetlinkMessage::Nl80211(_) => "Nl80211",
            NetlinkMessage::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for NetlinkMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetlinkMessage::ErrorAck(msg) => msg.fmt(f),
            NetlinkMessage::Control(msg) => msg.fmt(f),
            NetlinkMessage::Nl80211(msg) => msg.fmt(f),
            NetlinkMessage::Unknown(msg) => write!(
                f,
                "Unknown message type {} ({} bytes)",
                msg.header.message_type,
                msg.payload.len()
            ),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// Builds a concrete message from its header and the bytes after it.
pub type Decoder = fn(MessageHeader, &[u8]) -> Result<NetlinkMessage>;

/// Maps family ids to decoders.
#[derive(Debug, Clone)]
pub struct MessageFactory {
    decoders: HashMap<u16, Decoder>,
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFactory {
    /// A factory that knows the statically-numbered control family.
    pub fn new() -> Self {
        let mut decoders: HashMap<u16, Decoder> = HashMap::new();
        decoders.insert(control::GENL_ID_CTRL, control::decode);
        Self { decoders }
    }

    /// Register (or replace) the decoder for `family_id`.
    pub fn add(&mut self, family_id: u16, decoder: Decoder) {
        self.decoders.insert(family_id, decoder);
    }

    /// Whether a decoder is registered for `family_id`.
    pub fn contains(&self, family_id: u16) -> bool {
        self.decoders.contains_key(&family_id)
    }

    /// Decode one complete datagram.
    pub fn create(&self, datagram: &[u8]) -> Result<NetlinkMessage> {
        let hdr = NlMsgHdr::from_bytes(datagram)?;
        let len = hdr.nlmsg_len as usize;
        if len < NLMSG_HDRLEN || len > datagram.len() {
            return Err(Error::InvalidMessage(format!(
                "invalid message length: {} (have {})",
                len,
                datagram.len()
            )));
        }
        let header = MessageHeader::from(&hdr);
        let payload = &datagram[NLMSG_HDRLEN..len];

        match header.message_type {
            NlMsgType::NOOP => Ok(NetlinkMessage::Noop(header)),
            NlMsgType::ERROR => ErrorAckMessage::decode(header, payload).map(NetlinkMessage::ErrorAck),
            NlMsgType::DONE => Ok(NetlinkMessage::Done(header)),
            NlMsgType::OVERRUN => Ok(NetlinkMessage::Overrun(header)),
            family => match self.decoders.get(&family) {
                Some(decoder) => decoder(header, payload),
                None => {
                    tracing::debug!(family, "no decoder registered, keeping payload");
                    decode_opaque(header, payload)
                }
            },
        }
    }
}
