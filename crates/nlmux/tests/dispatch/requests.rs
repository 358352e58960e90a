//! Request/reply correlation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use nlmux::Error;
use nlmux::netlink::genl::control::ControlMessage;
use nlmux::netlink::genl::nl80211::{Nl80211Attr, Nl80211Command, Nl80211Message};
use nlmux::netlink::message::{NLM_F_ACK, NLM_F_DUMP};
use nlmux::netlink::{AckAction, AuxiliaryMessage, NetlinkMessage, NlMsgHdr, RequestHandlers};

use crate::common::{
    NL80211_FAMILY_ID, counting_handler, done_reply, error_reply, manager, nl80211_manager,
    nl80211_reply,
};

type AuxiliaryLog = Rc<RefCell<Vec<String>>>;

/// Auxiliary handler that records what it was told.
fn recorder() -> (Box<dyn FnMut(AuxiliaryMessage<'_>)>, AuxiliaryLog) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let entries = Rc::clone(&log);
    let handler: Box<dyn FnMut(AuxiliaryMessage<'_>)> = Box::new(move |aux| {
        let entry = match aux {
            AuxiliaryMessage::ErrorFromKernel(err) => format!("error {}", err.error),
            AuxiliaryMessage::UnexpectedResponseType(msg) => {
                format!("unexpected {}", msg.kind_name())
            }
            AuxiliaryMessage::Timeout => "timeout".to_string(),
            AuxiliaryMessage::Done => "done".to_string(),
        };
        entries.borrow_mut().push(entry);
    });
    (handler, log)
}

fn counter() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
    let count = Rc::new(Cell::new(0));
    (Rc::clone(&count), count)
}

#[test]
fn test_send_nl80211_requires_resolved_family() {
    let mut manager = manager();
    let mut request = Nl80211Message::new(Nl80211Command::GetWiphy);
    let err = manager
        .send_nl80211(&mut request, RequestHandlers::new())
        .unwrap_err();
    assert!(matches!(err, Error::FamilyNotResolved { name } if name == "nl80211"));
    assert!(manager.transport().sent.is_empty());
}

#[test]
fn test_send_nl80211_fills_family_id() {
    let mut manager = nl80211_manager();
    let mut request = Nl80211Message::new(Nl80211Command::GetWiphy);
    let seq = manager
        .send_nl80211(&mut request, RequestHandlers::new())
        .unwrap();

    assert_eq!(request.message_type(), NL80211_FAMILY_ID);
    let hdr = NlMsgHdr::from_bytes(manager.transport().sent.last().unwrap()).unwrap();
    assert_eq!(hdr.nlmsg_type, NL80211_FAMILY_ID);
    assert_eq!(hdr.nlmsg_seq, seq);
    // No handlers, nothing to wait for.
    assert!(!manager.is_pending(seq));
}

#[test]
fn test_replies_reach_only_their_request() {
    let mut manager = nl80211_manager();
    let (first_seen, first) = counter();
    let (second_seen, second) = counter();

    let mut request = Nl80211Message::new(Nl80211Command::GetInterface);
    let seq1 = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new().on_nl80211(move |_| first_seen.set(first_seen.get() + 1)),
        )
        .unwrap();
    let mut request = Nl80211Message::new(Nl80211Command::GetInterface);
    let seq2 = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new().on_nl80211(move |_| second_seen.set(second_seen.get() + 1)),
        )
        .unwrap();
    assert_ne!(seq1, seq2);

    manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewInterface, seq1, false));
    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 0);
    assert!(!manager.is_pending(seq1));
    assert!(manager.is_pending(seq2));

    manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewInterface, seq2, false));
    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 1);
    assert_eq!(manager.pending_requests(), 0);
}

#[test]
fn test_multipart_reply_until_done() {
    let mut manager = nl80211_manager();
    let (broadcast, broadcasts) = counting_handler();
    manager.add_broadcast_handler(broadcast).unwrap();

    let (seen, parts) = counter();
    let (aux, log) = recorder();
    let mut request = Nl80211Message::new(Nl80211Command::GetWiphy);
    request.add_flag(NLM_F_DUMP);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new()
                .on_nl80211(move |_| seen.set(seen.get() + 1))
                .on_auxiliary(aux),
        )
        .unwrap();

    for _ in 0..3 {
        manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewWiphy, seq, true));
        assert!(manager.is_pending(seq));
    }
    assert_eq!(parts.get(), 3);

    manager.on_raw_receive(&done_reply(seq));
    assert!(!manager.is_pending(seq));
    assert_eq!(*log.borrow(), vec!["done"]);

    // Stale part after completion goes to broadcast handlers.
    manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewWiphy, seq, true));
    assert_eq!(parts.get(), 3);
    assert_eq!(broadcasts.get(), 1);
}

#[test]
fn test_multipart_parts_in_one_read() {
    let mut manager = nl80211_manager();
    let (seen, parts) = counter();
    let (aux, log) = recorder();
    let mut request = Nl80211Message::new(Nl80211Command::GetScan);
    request.add_flag(NLM_F_DUMP);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new()
                .on_nl80211(move |_| seen.set(seen.get() + 1))
                .on_auxiliary(aux),
        )
        .unwrap();

    let mut read = nl80211_reply(Nl80211Command::NewScanResults, seq, true);
    read.extend(nl80211_reply(Nl80211Command::NewScanResults, seq, true));
    read.extend(done_reply(seq));
    manager.on_raw_receive(&read);

    assert_eq!(parts.get(), 2);
    assert_eq!(*log.borrow(), vec!["done"]);
    assert_eq!(manager.pending_requests(), 0);
}

#[test]
fn test_ack_completes_request() {
    let mut manager = nl80211_manager();
    let (acked, acks) = counter();
    let (aux, log) = recorder();
    let mut request = Nl80211Message::new(Nl80211Command::SetInterface);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new()
                .on_ack(move || {
                    acked.set(acked.get() + 1);
                    AckAction::Complete
                })
                .on_auxiliary(aux),
        )
        .unwrap();

    let hdr = NlMsgHdr::from_bytes(manager.transport().sent.last().unwrap()).unwrap();
    assert_eq!(hdr.nlmsg_flags & NLM_F_ACK, NLM_F_ACK);

    manager.on_raw_receive(&error_reply(seq, 0));
    assert_eq!(acks.get(), 1);
    assert!(log.borrow().is_empty());
    assert!(!manager.is_pending(seq));
}

#[test]
fn test_ack_without_ack_handler_completes_request() {
    let mut manager = nl80211_manager();
    let (seen, replies) = counter();
    let mut request = Nl80211Message::new(Nl80211Command::TriggerScan);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new().on_nl80211(move |_| seen.set(seen.get() + 1)),
        )
        .unwrap();

    manager.on_raw_receive(&error_reply(seq, 0));
    assert_eq!(replies.get(), 0);
    assert!(!manager.is_pending(seq));
}

#[test]
fn test_ack_can_keep_request_for_response() {
    let mut manager = nl80211_manager();
    let (seen, replies) = counter();
    let mut request = Nl80211Message::new(Nl80211Command::GetStation);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new()
                .on_nl80211(move |_| seen.set(seen.get() + 1))
                .on_ack(|| AckAction::AwaitResponse),
        )
        .unwrap();

    manager.on_raw_receive(&error_reply(seq, 0));
    assert!(manager.is_pending(seq));

    manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewStation, seq, false));
    assert_eq!(replies.get(), 1);
    assert!(!manager.is_pending(seq));
}

#[test]
fn test_kernel_error_reaches_auxiliary_handler() {
    let mut manager = nl80211_manager();
    let (seen, replies) = counter();
    let (aux, log) = recorder();
    let mut request = Nl80211Message::new(Nl80211Command::Connect);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new()
                .on_nl80211(move |_| seen.set(seen.get() + 1))
                .on_auxiliary(aux),
        )
        .unwrap();

    manager.on_raw_receive(&error_reply(seq, -16));
    assert_eq!(*log.borrow(), vec!["error -16"]);
    assert_eq!(replies.get(), 0);
    assert!(!manager.is_pending(seq));
}

#[test]
fn test_unexpected_response_type() {
    let mut manager = nl80211_manager();
    let (seen, replies) = counter();
    let (aux, log) = recorder();
    let mut request = ControlMessage::get_family("nl80211");
    let seq = manager
        .send_control(
            &mut request,
            RequestHandlers::new()
                .on_control(move |_| seen.set(seen.get() + 1))
                .on_auxiliary(aux),
        )
        .unwrap();

    manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewWiphy, seq, false));
    assert_eq!(replies.get(), 0);
    assert_eq!(*log.borrow(), vec!["unexpected Nl80211"]);
    assert!(!manager.is_pending(seq));
}

#[test]
fn test_any_handler_sees_every_family() {
    let mut manager = nl80211_manager();
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&kinds);
    let mut request = Nl80211Message::new(Nl80211Command::GetWiphy);
    request.add_flag(NLM_F_DUMP);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new()
                .on_any(move |msg: &NetlinkMessage| seen.borrow_mut().push(msg.kind_name())),
        )
        .unwrap();

    manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewWiphy, seq, true));
    manager.on_raw_receive(&done_reply(seq));
    assert_eq!(*kinds.borrow(), vec!["Nl80211"]);
}

#[test]
fn test_removed_handler_routes_reply_to_broadcast() {
    let mut manager = nl80211_manager();
    let (broadcast, broadcasts) = counting_handler();
    manager.add_broadcast_handler(broadcast).unwrap();

    let (seen, replies) = counter();
    let mut request = Nl80211Message::new(Nl80211Command::GetReg);
    let seq = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new().on_nl80211(move |_| seen.set(seen.get() + 1)),
        )
        .unwrap();

    assert!(manager.remove_message_handler(seq));
    assert!(!manager.remove_message_handler(seq));

    manager.on_raw_receive(&nl80211_reply(Nl80211Command::GetReg, seq, false));
    assert_eq!(replies.get(), 0);
    assert_eq!(broadcasts.get(), 1);
}

#[test]
fn test_failed_write_rolls_back_registration() {
    let mut manager = nl80211_manager();
    manager.transport_mut().fail_writes = true;

    let mut request = Nl80211Message::new(Nl80211Command::TriggerScan);
    let result = manager.send_nl80211(&mut request, RequestHandlers::new().on_nl80211(|_| {}));
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(manager.pending_requests(), 0);

    manager.transport_mut().fail_writes = false;
    let seq = manager
        .send_nl80211(&mut request, RequestHandlers::new().on_nl80211(|_| {}))
        .unwrap();
    assert!(manager.is_pending(seq));
}

#[test]
fn test_oversized_attribute_fails_before_registration() {
    let mut manager = nl80211_manager();
    let mut request = Nl80211Message::new(Nl80211Command::TriggerScan);
    let ie = Nl80211Attr::Ie as u16;
    request.attributes_mut().create::<Vec<u8>>(ie, "NL80211_ATTR_IE");
    request.attributes_mut().set(ie, vec![0xdd; 70_000]);

    let result = manager.send_nl80211(&mut request, RequestHandlers::new().on_nl80211(|_| {}));
    assert!(matches!(result, Err(Error::InvalidAttribute(_))));
    assert_eq!(manager.pending_requests(), 0);
    assert!(manager.transport().sent.is_empty());
}

#[test]
fn test_duplicate_sequence_is_rejected() {
    let mut manager = nl80211_manager();
    manager.transport_mut().fixed_seq = Some(7);

    let mut request = Nl80211Message::new(Nl80211Command::GetInterface);
    let seq = manager
        .send_nl80211(&mut request, RequestHandlers::new().on_nl80211(|_| {}))
        .unwrap();
    assert_eq!(seq, 7);
    let sent = manager.transport().sent.len();

    let mut request = Nl80211Message::new(Nl80211Command::GetInterface);
    let err = manager
        .send_nl80211(&mut request, RequestHandlers::new().on_nl80211(|_| {}))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateSequence { seq: 7 }));
    assert_eq!(manager.transport().sent.len(), sent);
    assert_eq!(manager.pending_requests(), 1);
}

#[test]
fn test_reset_drops_pending_requests() {
    let mut manager = nl80211_manager();
    let mut request = Nl80211Message::new(Nl80211Command::GetInterface);
    manager
        .send_nl80211(&mut request, RequestHandlers::new().on_nl80211(|_| {}))
        .unwrap();
    assert_eq!(manager.pending_requests(), 1);

    manager.reset();
    assert_eq!(manager.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_request_is_swept_on_next_send() {
    let mut manager = nl80211_manager();
    let (broadcast, broadcasts) = counting_handler();
    manager.add_broadcast_handler(broadcast).unwrap();

    let (aux, log) = recorder();
    let mut request = Nl80211Message::new(Nl80211Command::TriggerScan);
    let stale = manager
        .send_nl80211(
            &mut request,
            RequestHandlers::new().on_nl80211(|_| {}).on_auxiliary(aux),
        )
        .unwrap();

    // Not yet expired.
    tokio::time::advance(Duration::from_secs(4)).await;
    let mut request = Nl80211Message::new(Nl80211Command::GetInterface);
    manager.send_nl80211(&mut request, RequestHandlers::new()).unwrap();
    assert!(manager.is_pending(stale));
    assert!(log.borrow().is_empty());

    tokio::time::advance(Duration::from_secs(2)).await;
    // Expiry is only noticed by the next send.
    assert!(manager.is_pending(stale));
    let mut request = Nl80211Message::new(Nl80211Command::GetInterface);
    let fresh = manager
        .send_nl80211(&mut request, RequestHandlers::new().on_nl80211(|_| {}))
        .unwrap();
    assert!(!manager.is_pending(stale));
    assert!(manager.is_pending(fresh));
    assert_eq!(*log.borrow(), vec!["timeout"]);

    // A late reply is just another broadcast.
    manager.on_raw_receive(&nl80211_reply(Nl80211Command::NewScanResults, stale, false));
    assert_eq!(broadcasts.get(), 1);
}
