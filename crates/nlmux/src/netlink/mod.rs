//! Generic netlink engine: TLV attributes, message framing, the control and
//! nl80211 families, and a request dispatcher.
//!
//! # Quick Start
//!
//! ```ignore
//! use nlmux::netlink::genl::nl80211::{self, NL80211_FAMILY_NAME, Nl80211Command};
//! use nlmux::netlink::{NetlinkManager, NetlinkSocket, RequestHandlers};
//!
//! let mut manager = NetlinkManager::new(NetlinkSocket::new()?);
//! manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode)?;
//!
//! let mut request = Nl80211Message::new(Nl80211Command::GetWiphy);
//! request.add_flag(NLM_F_DUMP);
//! manager.send_nl80211(
//!     &mut request,
//!     RequestHandlers::new()
//!         .on_nl80211(|wiphy| println!("{wiphy}"))
//!         .on_auxiliary(|aux| println!("{aux}")),
//! )?;
//! ```
//!
//! Replies are delivered by [`NetlinkManager::on_raw_receive`], normally
//! called from a [`driver::Driver`].

pub mod attr;
pub mod attribute;
mod builder;
pub mod driver;
mod error;
#[cfg(test)]
mod fixtures;
pub mod genl;
pub mod manager;
pub mod message;
pub mod schema;
mod socket;

pub use attr::{AttrIter, NlAttr};
pub use attribute::{Attribute, AttributeList, AttributeType, AttributeValue};
pub use builder::MessageBuilder;
pub use driver::Driver;
pub use error::{Error, Result};
pub use manager::{
    AckAction, AuxiliaryMessage, BroadcastHandler, ManagerConfig, NetlinkManager, RequestHandlers,
};
pub use message::{
    GenericNetlinkMessage, MessageFactory, MessageHeader, NLMSG_HDRLEN, NetlinkMessage, NlMsgHdr,
    NlMsgType,
};
pub use schema::{AttrKind, AttrSpec, NestedSchema};
pub use socket::{NetlinkSocket, SequenceCounter, Transport};
