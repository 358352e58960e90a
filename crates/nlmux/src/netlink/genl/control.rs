//! The generic netlink control family (`nlctrl`).
//!
//! The control family has the fixed id [`GENL_ID_CTRL`] and is used to map
//! family names to their dynamically assigned ids and multicast groups:
//! a `CTRL_CMD_GETFAMILY` request carrying the family name is answered with
//! `CTRL_CMD_NEWFAMILY`.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::netlink::attribute::{AttributeList, AttributeValue};
use crate::netlink::error::Result;
use crate::netlink::message::{GenericNetlinkMessage, MessageHeader, NetlinkMessage};
use crate::netlink::schema::{AttrKind, AttrSpec, NestedSchema};

// Control family constants (fixed, not dynamically assigned)
pub const GENL_ID_CTRL: u16 = 0x10;

/// Control family commands
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    Unspec = 0,
    NewFamily = 1,
    DelFamily = 2,
    GetFamily = 3,
    NewOps = 4,
    DelOps = 5,
    GetOps = 6,
    NewMcastGrp = 7,
    DelMcastGrp = 8,
    GetMcastGrp = 9,
    GetPolicy = 10,
}

impl CtrlCmd {
    pub fn from_u8(cmd: u8) -> Option<Self> {
        Some(match cmd {
            0 => CtrlCmd::Unspec,
            1 => CtrlCmd::NewFamily,
            2 => CtrlCmd::DelFamily,
            3 => CtrlCmd::GetFamily,
            4 => CtrlCmd::NewOps,
            5 => CtrlCmd::DelOps,
            6 => CtrlCmd::GetOps,
            7 => CtrlCmd::NewMcastGrp,
            8 => CtrlCmd::DelMcastGrp,
            9 => CtrlCmd::GetMcastGrp,
            10 => CtrlCmd::GetPolicy,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            CtrlCmd::Unspec => "CTRL_CMD_UNSPEC",
            CtrlCmd::NewFamily => "CTRL_CMD_NEWFAMILY",
            CtrlCmd::DelFamily => "CTRL_CMD_DELFAMILY",
            CtrlCmd::GetFamily => "CTRL_CMD_GETFAMILY",
            CtrlCmd::NewOps => "CTRL_CMD_NEWOPS",
            CtrlCmd::DelOps => "CTRL_CMD_DELOPS",
            CtrlCmd::GetOps => "CTRL_CMD_GETOPS",
            CtrlCmd::NewMcastGrp => "CTRL_CMD_NEWMCAST_GRP",
            CtrlCmd::DelMcastGrp => "CTRL_CMD_DELMCAST_GRP",
            CtrlCmd::GetMcastGrp => "CTRL_CMD_GETMCAST_GRP",
            CtrlCmd::GetPolicy => "CTRL_CMD_GETPOLICY",
        }
    }
}

/// Control family attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    Unspec = 0,
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
    Ops = 6,
    McastGroups = 7,
}

/// Control family multicast group attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrMcastGrp {
    Unspec = 0,
    Name = 1,
    Id = 2,
}

/// Control family operation attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrOp {
    Unspec = 0,
    Id = 1,
    Flags = 2,
}

static OP: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(CtrlAttrOp::Id as u16, "CTRL_ATTR_OP_ID", AttrKind::U32),
    AttrSpec::new(CtrlAttrOp::Flags as u16, "CTRL_ATTR_OP_FLAGS", AttrKind::U32),
]);

static OPS: NestedSchema = NestedSchema::Array(AttrSpec::nested(0, "CTRL_ATTR_OP", &OP));

static MCAST_GROUP: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(
        CtrlAttrMcastGrp::Name as u16,
        "CTRL_ATTR_MCAST_GRP_NAME",
        AttrKind::String,
    ),
    AttrSpec::new(CtrlAttrMcastGrp::Id as u16, "CTRL_ATTR_MCAST_GRP_ID", AttrKind::U32),
]);

static MCAST_GROUPS: NestedSchema =
    NestedSchema::Array(AttrSpec::nested(0, "CTRL_ATTR_MCAST_GRP", &MCAST_GROUP));

/// Top-level attribute space of the control family.
pub static CONTROL_ATTRIBUTES: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(CtrlAttr::FamilyId as u16, "CTRL_ATTR_FAMILY_ID", AttrKind::U16),
    AttrSpec::new(CtrlAttr::FamilyName as u16, "CTRL_ATTR_FAMILY_NAME", AttrKind::String),
    AttrSpec::new(CtrlAttr::Version as u16, "CTRL_ATTR_VERSION", AttrKind::U32),
    AttrSpec::new(CtrlAttr::HdrSize as u16, "CTRL_ATTR_HDRSIZE", AttrKind::U32),
    AttrSpec::new(CtrlAttr::MaxAttr as u16, "CTRL_ATTR_MAXATTR", AttrKind::U32),
    AttrSpec::nested(CtrlAttr::Ops as u16, "CTRL_ATTR_OPS", &OPS),
    AttrSpec::nested(CtrlAttr::McastGroups as u16, "CTRL_ATTR_MCAST_GROUPS", &MCAST_GROUPS),
]);

/// What the kernel reported about a family in `CTRL_CMD_NEWFAMILY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyInfo {
    /// Dynamically assigned family ID (used as nlmsg_type).
    pub id: u16,
    /// Family name.
    pub name: String,
    /// Family version.
    pub version: u32,
    /// Header size (additional bytes after genlmsghdr).
    pub hdr_size: u32,
    /// Maximum attribute number.
    pub max_attr: u32,
    /// Multicast groups: name -> group ID.
    pub mcast_groups: HashMap<String, u32>,
}

impl FamilyInfo {
    /// Look up a multicast group id by name.
    pub fn group(&self, name: &str) -> Option<u32> {
        self.mcast_groups.get(name).copied()
    }
}

/// A message of the control family.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlMessage(GenericNetlinkMessage);

impl ControlMessage {
    /// An empty request for `command`.
    pub fn new(command: CtrlCmd) -> Self {
        Self(GenericNetlinkMessage::new(GENL_ID_CTRL, command as u8))
    }

    /// `CTRL_CMD_GETFAMILY` asking for the family called `name`.
    pub fn get_family(name: &str) -> Self {
        let mut msg = Self::new(CtrlCmd::GetFamily);
        let attrs = msg.attributes_mut();
        attrs.create::<String>(CtrlAttr::FamilyName as u16, "CTRL_ATTR_FAMILY_NAME");
        attrs.set(CtrlAttr::FamilyName as u16, name.to_string());
        msg
    }

    /// The command, if it is one the control family defines.
    pub fn ctrl_command(&self) -> Option<CtrlCmd> {
        CtrlCmd::from_u8(self.command)
    }

    /// Extract family id, name and groups from a `CTRL_CMD_NEWFAMILY`.
    ///
    /// Returns `None` if the id or name is missing. Groups without a name or
    /// id are skipped.
    pub fn family_info(&self) -> Option<FamilyInfo> {
        let attrs = self.attributes();
        let id = attrs.get::<u16>(CtrlAttr::FamilyId as u16)?;
        let name = attrs.get_str(CtrlAttr::FamilyName as u16)?.to_string();

        let mut mcast_groups = HashMap::new();
        if let Some(groups) = attrs.get_nested(CtrlAttr::McastGroups as u16) {
            for group in groups.iter() {
                let Some(AttributeValue::Nested(entry)) = group.value() else {
                    continue;
                };
                let group_name = entry.get_str(CtrlAttrMcastGrp::Name as u16);
                let group_id = entry.get::<u32>(CtrlAttrMcastGrp::Id as u16);
                match (group_name, group_id) {
                    (Some(group_name), Some(group_id)) => {
                        mcast_groups.insert(group_name.to_string(), group_id);
                    }
                    _ => tracing::warn!(family = %name, index = group.id(), "incomplete multicast group"),
                }
            }
        }

        Some(FamilyInfo {
            id,
            name,
            version: attrs.get::<u32>(CtrlAttr::Version as u16).unwrap_or(0),
            hdr_size: attrs.get::<u32>(CtrlAttr::HdrSize as u16).unwrap_or(0),
            max_attr: attrs.get::<u32>(CtrlAttr::MaxAttr as u16).unwrap_or(0),
            mcast_groups,
        })
    }
}

impl Deref for ControlMessage {
    type Target = GenericNetlinkMessage;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ControlMessage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.ctrl_command().map_or("<UNKNOWN CONTROL COMMAND>", CtrlCmd::name);
        write!(f, "Message {} ({}){}", name, self.command, self.attributes())
    }
}

/// [`Decoder`](crate::netlink::message::Decoder) for the control family.
pub fn decode(header: MessageHeader, payload: &[u8]) -> Result<NetlinkMessage> {
    let (genl, attrs) = GenericNetlinkMessage::split_payload(payload)?;
    if CtrlCmd::from_u8(genl.cmd).is_none() {
        tracing::warn!(command = genl.cmd, "unknown control command");
    }
    Ok(NetlinkMessage::Control(ControlMessage(GenericNetlinkMessage {
        header,
        command: genl.cmd,
        attributes: AttributeList::decode(attrs, &CONTROL_ATTRIBUTES),
    })))
}
