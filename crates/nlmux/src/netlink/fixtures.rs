//! Datagrams shared by unit tests.

use super::genl::control::{ControlMessage, CtrlAttr, CtrlAttrMcastGrp, CtrlCmd};

/// Family id the kernel happened to assign nl80211 when these were captured.
pub const NL80211_FAMILY_ID: u16 = 0x13;

/// NL80211_CMD_DISCONNECT: wiphy 0, ifindex 4, reason 2, disconnected by AP.
pub const DISCONNECT: [u8; 48] = [
    0x30, 0x00, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x30, 0x01, 0x00, 0x00, 0x08, 0x00, 0x01, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x08, 0x00, 0x03, 0x00, //
    0x04, 0x00, 0x00, 0x00, 0x06, 0x00, 0x36, 0x00, //
    0x02, 0x00, 0x00, 0x00, 0x04, 0x00, 0x47, 0x00, //
];

/// NLMSG_ERROR with code 0, sequence 1.
pub const ACK: [u8; 20] = [
    0x14, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, //
];

/// A CTRL_CMD_NEWFAMILY reply announcing `name` at `id` with `groups`.
pub fn new_family(id: u16, name: &str, groups: &[(&str, u32)], seq: u32) -> Vec<u8> {
    let mut msg = ControlMessage::new(CtrlCmd::NewFamily);
    let attrs = msg.attributes_mut();
    attrs.create::<u16>(CtrlAttr::FamilyId as u16, "CTRL_ATTR_FAMILY_ID");
    attrs.set(CtrlAttr::FamilyId as u16, id);
    attrs.create::<String>(CtrlAttr::FamilyName as u16, "CTRL_ATTR_FAMILY_NAME");
    attrs.set(CtrlAttr::FamilyName as u16, name.to_string());
    attrs.create_nested(CtrlAttr::McastGroups as u16, "CTRL_ATTR_MCAST_GROUPS");
    if let Some(list) = attrs.get_nested_mut(CtrlAttr::McastGroups as u16) {
        for (index, (group, group_id)) in groups.iter().enumerate() {
            let slot = index as u16 + 1;
            list.create_nested(slot, "CTRL_ATTR_MCAST_GRP");
            if let Some(entry) = list.get_nested_mut(slot) {
                entry.create::<String>(CtrlAttrMcastGrp::Name as u16, "CTRL_ATTR_MCAST_GRP_NAME");
                entry.set(CtrlAttrMcastGrp::Name as u16, group.to_string());
                entry.create::<u32>(CtrlAttrMcastGrp::Id as u16, "CTRL_ATTR_MCAST_GRP_ID");
                entry.set(CtrlAttrMcastGrp::Id as u16, *group_id);
            }
            list.set_nested_has_value(slot);
        }
    }
    attrs.set_nested_has_value(CtrlAttr::McastGroups as u16);
    msg.encode(seq).expect("valid control message")
}
