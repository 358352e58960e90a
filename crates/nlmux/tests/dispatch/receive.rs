//! Raw read splitting and broadcast handlers.

use std::cell::RefCell;
use std::rc::Rc;

use nlmux::Error;
use nlmux::netlink::genl::nl80211::Nl80211Command;
use nlmux::netlink::{BroadcastHandler, NetlinkMessage};

use crate::common::{DISCONNECT, counting_handler, error_reply, manager, nl80211_manager};

/// A minimal datagram: 20 bytes, type 0.
const GOOD_MESSAGE: [u8; 20] = [
    0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, //
];

/// A header declaring 0x30 bytes with nothing after it.
const TRUNCATED_MESSAGE: [u8; 16] = [
    0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
];

#[test]
fn test_invalid_reads_touch_no_handler() {
    let mut manager = manager();
    let (handler, count) = counting_handler();
    manager.add_broadcast_handler(handler).unwrap();

    manager.on_raw_receive(&[0x01]);
    manager.on_raw_receive(&[0x04, 0x00, 0x00, 0x00]);
    manager.on_raw_receive(&TRUNCATED_MESSAGE);
    assert_eq!(count.get(), 0);
}

#[test]
fn test_truncated_tail_is_dropped() {
    let mut manager = manager();
    let (handler, count) = counting_handler();
    manager.add_broadcast_handler(handler).unwrap();

    let mut read = GOOD_MESSAGE.to_vec();
    read.extend_from_slice(&TRUNCATED_MESSAGE);
    manager.on_raw_receive(&read);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_zero_length_header_stops_processing() {
    let mut manager = manager();
    let (handler, count) = counting_handler();
    manager.add_broadcast_handler(handler).unwrap();

    let mut read = vec![0u8; 16];
    read.extend_from_slice(&GOOD_MESSAGE);
    manager.on_raw_receive(&read);
    assert_eq!(count.get(), 0);
}

#[test]
fn test_several_datagrams_in_one_read() {
    let mut manager = nl80211_manager();
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&kinds);
    manager
        .add_broadcast_handler(Rc::new(move |msg: &NetlinkMessage| {
            seen.borrow_mut().push(msg.kind_name())
        }))
        .unwrap();

    let mut read = DISCONNECT.to_vec();
    read.extend(error_reply(0, 0));
    read.extend_from_slice(&DISCONNECT);
    manager.on_raw_receive(&read);
    assert_eq!(*kinds.borrow(), vec!["Nl80211", "ACK", "Nl80211"]);
}

#[test]
fn test_undecodable_datagram_is_skipped() {
    let mut manager = nl80211_manager();
    let (handler, count) = counting_handler();
    manager.add_broadcast_handler(handler).unwrap();

    // nl80211 datagram too short to hold a genl header.
    let mut broken = DISCONNECT[..16].to_vec();
    broken[0] = 0x10;
    let mut read = broken;
    read.extend_from_slice(&DISCONNECT);
    manager.on_raw_receive(&read);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_disconnect_broadcast_is_decoded() {
    let mut manager = nl80211_manager();
    let commands = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&commands);
    manager
        .add_broadcast_handler(Rc::new(move |msg: &NetlinkMessage| {
            if let NetlinkMessage::Nl80211(event) = msg {
                seen.borrow_mut().push(event.nl80211_command());
            }
        }))
        .unwrap();

    manager.on_raw_receive(&DISCONNECT);
    assert_eq!(*commands.borrow(), vec![Nl80211Command::Disconnect]);
}

#[test]
fn test_broadcast_handlers_run_in_registration_order() {
    let mut manager = manager();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = Rc::clone(&order);
        manager
            .add_broadcast_handler(Rc::new(move |_msg: &NetlinkMessage| {
                order.borrow_mut().push(tag)
            }))
            .unwrap();
    }

    manager.on_raw_receive(&GOOD_MESSAGE);
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_broadcast_handler_identity() {
    let mut manager = manager();
    let (handler, count) = counting_handler();
    let (other, _) = counting_handler();

    manager.add_broadcast_handler(Rc::clone(&handler)).unwrap();
    assert!(manager.find_broadcast_handler(&handler));
    assert!(!manager.find_broadcast_handler(&other));
    assert!(matches!(
        manager.add_broadcast_handler(Rc::clone(&handler)),
        Err(Error::DuplicateHandler)
    ));

    manager.on_raw_receive(&GOOD_MESSAGE);
    assert_eq!(count.get(), 1);

    assert!(matches!(
        manager.remove_broadcast_handler(&other),
        Err(Error::HandlerNotFound)
    ));
    manager.remove_broadcast_handler(&handler).unwrap();
    assert!(!manager.find_broadcast_handler(&handler));
    assert!(manager.remove_broadcast_handler(&handler).is_err());

    manager.on_raw_receive(&GOOD_MESSAGE);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_clear_broadcast_handlers() {
    let mut manager = manager();
    let handlers: Vec<(BroadcastHandler, _)> = (0..3).map(|_| counting_handler()).collect();
    for (handler, _) in &handlers {
        manager.add_broadcast_handler(Rc::clone(handler)).unwrap();
    }

    manager.clear_broadcast_handlers();
    manager.on_raw_receive(&GOOD_MESSAGE);
    for (handler, count) in &handlers {
        assert!(!manager.find_broadcast_handler(handler));
        assert_eq!(count.get(), 0);
    }
}
