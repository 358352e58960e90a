//! Family resolution and multicast subscription.

use std::cell::RefCell;
use std::rc::Rc;

use nlmux::netlink::NetlinkMessage;
use nlmux::netlink::genl::control::CtrlCmd;
use nlmux::netlink::genl::nl80211::{self, NL80211_FAMILY_NAME};
use nlmux::netlink::message::{ILLEGAL_MESSAGE_TYPE, decode_opaque};
use nlmux::Error;

use crate::common::{
    DISCONNECT, NL80211_FAMILY_ID, Reply, counting_handler, error_reply, manager, new_family,
    nl80211_manager,
};

fn marx_groups() -> Vec<(&'static str, u32)> {
    vec![
        ("groucho", 21),
        ("harpo", 22),
        ("chico", 23),
        ("zeppo", 24),
        ("gummo", 25),
    ]
}

#[test]
fn test_resolve_family_sends_getfamily() {
    let mut manager = manager();
    manager
        .transport_mut()
        .push(Reply::ToLastRequest(new_family(NL80211_FAMILY_ID, NL80211_FAMILY_NAME, &[])));

    let id = manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode).unwrap();
    assert_eq!(id, NL80211_FAMILY_ID);

    let sent = &manager.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][16], CtrlCmd::GetFamily as u8);
    assert_eq!(&sent[0][24..31], b"nl80211");
    assert_eq!(manager.pending_requests(), 0);
}

#[test]
fn test_resolve_family_is_cached() {
    let mut manager = manager();
    manager
        .transport_mut()
        .push(Reply::ToLastRequest(new_family(NL80211_FAMILY_ID, NL80211_FAMILY_NAME, &[])));
    manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode).unwrap();

    let id = manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode).unwrap();
    assert_eq!(id, NL80211_FAMILY_ID);
    assert_eq!(manager.transport().sent.len(), 1);
}

#[test]
fn test_resolve_family_registers_decoder() {
    let mut manager = nl80211_manager();
    let (handler, count) = counting_handler();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let kinds = Rc::clone(&seen);
    manager.add_broadcast_handler(handler).unwrap();
    manager
        .add_broadcast_handler(Rc::new(move |msg: &NetlinkMessage| {
            kinds.borrow_mut().push(msg.kind_name())
        }))
        .unwrap();

    manager.on_raw_receive(&DISCONNECT);
    assert_eq!(count.get(), 1);
    assert_eq!(*seen.borrow(), vec!["Nl80211"]);
}

#[test]
fn test_resolve_family_dispatches_interstitial_messages() {
    let mut manager = manager();
    let (handler, count) = counting_handler();
    manager.add_broadcast_handler(handler).unwrap();

    manager.transport_mut().push(Reply::Raw(DISCONNECT.to_vec()));
    manager.transport_mut().push(Reply::Raw(DISCONNECT.to_vec()));
    manager
        .transport_mut()
        .push(Reply::ToLastRequest(new_family(NL80211_FAMILY_ID, NL80211_FAMILY_NAME, &[])));

    let id = manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode).unwrap();
    assert_eq!(id, NL80211_FAMILY_ID);
    assert_eq!(count.get(), 2);
}

#[test]
fn test_resolve_family_times_out() {
    let mut manager = manager();
    let (handler, count) = counting_handler();
    manager.add_broadcast_handler(handler).unwrap();
    manager.transport_mut().push(Reply::Raw(DISCONNECT.to_vec()));

    let id = manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode).unwrap();
    assert_eq!(id, ILLEGAL_MESSAGE_TYPE);
    assert_eq!(count.get(), 1);
    assert!(manager.family(NL80211_FAMILY_NAME).is_none());
    assert_eq!(manager.pending_requests(), 0);
}

#[test]
fn test_resolve_family_kernel_refusal() {
    let mut manager = manager();
    manager
        .transport_mut()
        .push(Reply::ToLastRequest(error_reply(0, -2)));

    let err = manager.resolve_family("stooges", decode_opaque).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.errno(), Some(2));
    assert!(manager.family("stooges").is_none());
}

#[test]
fn test_subscribe() {
    let mut manager = manager();
    manager
        .transport_mut()
        .push(Reply::ToLastRequest(new_family(20, "marx", &marx_groups())));
    assert_eq!(manager.resolve_family("marx", decode_opaque).unwrap(), 20);

    let family = manager.family("marx").unwrap();
    assert_eq!(family.group("zeppo"), Some(24));
    assert_eq!(family.mcast_groups.len(), 5);

    manager.subscribe("marx", "harpo").unwrap();
    manager.subscribe("marx", "gummo").unwrap();
    assert_eq!(manager.transport().memberships, vec![22, 25]);

    assert!(matches!(
        manager.subscribe("stooges", "moe"),
        Err(Error::UnknownFamily { name }) if name == "stooges"
    ));
    assert!(matches!(
        manager.subscribe("marx", "moe"),
        Err(Error::UnknownGroup { family, group }) if family == "marx" && group == "moe"
    ));
    assert_eq!(manager.transport().memberships.len(), 2);
}

#[test]
fn test_reset_forgets_families() {
    let mut manager = nl80211_manager();
    assert!(manager.family(NL80211_FAMILY_NAME).is_some());

    manager.reset();
    assert!(manager.family(NL80211_FAMILY_NAME).is_none());
    assert!(manager.subscribe(NL80211_FAMILY_NAME, "scan").is_err());
}
