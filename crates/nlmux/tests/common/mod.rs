//! Common test utilities for dispatch tests.
//!
//! Provides `MockTransport`, a scripted stand-in for the netlink socket,
//! and builders for the datagrams the kernel would send.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use nlmux::netlink::genl::control::{ControlMessage, CtrlAttr, CtrlAttrMcastGrp, CtrlCmd};
use nlmux::netlink::genl::nl80211::{self, NL80211_FAMILY_NAME, Nl80211Command, Nl80211Message};
use nlmux::netlink::message::{NLM_F_MULTI, NLM_F_REQUEST};
use nlmux::netlink::{
    BroadcastHandler, ManagerConfig, MessageBuilder, NetlinkManager, NetlinkMessage, NlMsgHdr,
    NlMsgType, SequenceCounter, Transport,
};
use nlmux::{Error, Result};

/// Family id used for nl80211 throughout the tests.
pub const NL80211_FAMILY_ID: u16 = 0x13;

/// NL80211_CMD_DISCONNECT broadcast: wiphy 0, ifindex 4, reason 2, by AP.
pub const DISCONNECT: [u8; 48] = [
    0x30, 0x00, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x30, 0x01, 0x00, 0x00, 0x08, 0x00, 0x01, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x08, 0x00, 0x03, 0x00, //
    0x04, 0x00, 0x00, 0x00, 0x06, 0x00, 0x36, 0x00, //
    0x02, 0x00, 0x00, 0x00, 0x04, 0x00, 0x47, 0x00, //
];

/// A queued reply.
pub enum Reply {
    /// Delivered as is.
    Raw(Vec<u8>),
    /// Sequence number rewritten to that of the most recent send.
    ToLastRequest(Vec<u8>),
}

/// Scripted transport: records sends, replays queued replies.
#[derive(Default)]
pub struct MockTransport {
    seq: SequenceCounter,
    /// Hand out this sequence number every time instead of counting.
    pub fixed_seq: Option<u32>,
    pub fail_writes: bool,
    pub sent: Vec<Vec<u8>>,
    pub replies: VecDeque<Reply>,
    pub memberships: Vec<u32>,
    pub recv_buffer_size: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reply: Reply) {
        self.replies.push_back(reply);
    }

    fn last_seq(&self) -> u32 {
        self.sent
            .last()
            .and_then(|bytes| NlMsgHdr::from_bytes(bytes).ok())
            .map_or(0, |hdr| hdr.nlmsg_seq)
    }

    fn next_reply(&mut self) -> Option<Vec<u8>> {
        match self.replies.pop_front()? {
            Reply::Raw(bytes) => Some(bytes),
            Reply::ToLastRequest(mut bytes) => {
                bytes[8..12].copy_from_slice(&self.last_seq().to_ne_bytes());
                Some(bytes)
            }
        }
    }
}

impl Transport for MockTransport {
    fn next_seq(&mut self) -> u32 {
        self.fixed_seq.unwrap_or_else(|| self.seq.next())
    }

    fn pid(&self) -> u32 {
        4242
    }

    fn send(&mut self, datagram: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
        }
        self.sent.push(datagram.to_vec());
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        match self.next_reply() {
            Some(bytes) => Ok(Some(bytes)),
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn try_recv(&mut self) -> io::Result<Vec<u8>> {
        self.next_reply()
            .ok_or_else(|| io::ErrorKind::WouldBlock.into())
    }

    fn add_membership(&mut self, group: u32) -> Result<()> {
        self.memberships.push(group);
        Ok(())
    }

    fn set_recv_buffer_size(&mut self, size: usize) {
        self.recv_buffer_size = size;
    }
}

/// A manager whose family lookups give up quickly.
pub fn manager() -> NetlinkManager<MockTransport> {
    NetlinkManager::with_config(
        MockTransport::new(),
        ManagerConfig::new().with_family_wait(Duration::from_millis(20)),
    )
}

/// A manager that has already resolved nl80211.
pub fn nl80211_manager() -> NetlinkManager<MockTransport> {
    let mut manager = manager();
    manager.transport_mut().push(Reply::ToLastRequest(new_family(
        NL80211_FAMILY_ID,
        NL80211_FAMILY_NAME,
        &[("config", 2), ("scan", 3), ("regulatory", 4), ("mlme", 5)],
    )));
    let id = manager
        .resolve_family(NL80211_FAMILY_NAME, nl80211::decode)
        .expect("resolve nl80211");
    assert_eq!(id, NL80211_FAMILY_ID);
    manager
}

/// CTRL_CMD_NEWFAMILY announcing `name` at `id`.
pub fn new_family(id: u16, name: &str, groups: &[(&str, u32)]) -> Vec<u8> {
    let mut msg = ControlMessage::new(CtrlCmd::NewFamily);
    let attrs = msg.attributes_mut();
    attrs.create::<u16>(CtrlAttr::FamilyId as u16, "CTRL_ATTR_FAMILY_ID");
    attrs.set(CtrlAttr::FamilyId as u16, id);
    attrs.create::<String>(CtrlAttr::FamilyName as u16, "CTRL_ATTR_FAMILY_NAME");
    attrs.set(CtrlAttr::FamilyName as u16, name.to_string());
    attrs.create_nested(CtrlAttr::McastGroups as u16, "CTRL_ATTR_MCAST_GROUPS");
    let list = attrs
        .get_nested_mut(CtrlAttr::McastGroups as u16)
        .expect("groups list");
    for (index, (group, group_id)) in groups.iter().enumerate() {
        let slot = index as u16 + 1;
        list.create_nested(slot, "CTRL_ATTR_MCAST_GRP");
        let entry = list.get_nested_mut(slot).expect("group entry");
        entry.create::<String>(CtrlAttrMcastGrp::Name as u16, "CTRL_ATTR_MCAST_GRP_NAME");
        entry.set(CtrlAttrMcastGrp::Name as u16, group.to_string());
        entry.create::<u32>(CtrlAttrMcastGrp::Id as u16, "CTRL_ATTR_MCAST_GRP_ID");
        entry.set(CtrlAttrMcastGrp::Id as u16, *group_id);
        list.set_nested_has_value(slot);
    }
    attrs.set_nested_has_value(CtrlAttr::McastGroups as u16);
    msg.encode(1).expect("encode NEWFAMILY")
}

/// An nl80211 message from the kernel with the given sequence number.
pub fn nl80211_reply(command: Nl80211Command, seq: u32, multi: bool) -> Vec<u8> {
    let mut msg = Nl80211Message::new(command);
    msg.set_message_type(NL80211_FAMILY_ID);
    if multi {
        msg.add_flag(NLM_F_MULTI);
    }
    msg.encode(seq).expect("encode nl80211 reply")
}

/// NLMSG_ERROR carrying `error` (0 for an ACK) in answer to `seq`.
pub fn error_reply(seq: u32, error: i32) -> Vec<u8> {
    let mut builder = MessageBuilder::new(NlMsgType::ERROR, 0);
    builder.set_seq(seq);
    let mut payload = error.to_ne_bytes().to_vec();
    let mut echoed = NlMsgHdr::new(NL80211_FAMILY_ID, NLM_F_REQUEST);
    echoed.nlmsg_seq = seq;
    payload.extend_from_slice(echoed.as_bytes());
    builder.append_bytes(&payload);
    builder.finish()
}

/// NLMSG_DONE ending the multipart reply to `seq`.
pub fn done_reply(seq: u32) -> Vec<u8> {
    let mut builder = MessageBuilder::new(NlMsgType::DONE, NLM_F_MULTI);
    builder.set_seq(seq);
    builder.append_bytes(&0i32.to_ne_bytes());
    builder.finish()
}

/// A broadcast handler that counts its calls.
pub fn counting_handler() -> (BroadcastHandler, Rc<Cell<usize>>) {
    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    let handler: BroadcastHandler = Rc::new(move |_msg: &NetlinkMessage| seen.set(seen.get() + 1));
    (handler, count)
}
