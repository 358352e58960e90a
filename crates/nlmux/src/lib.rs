//! Generic netlink engine for Linux WiFi management.
//!
//! This crate implements the netlink plumbing a wireless connection manager
//! needs: a typed TLV attribute codec, generic netlink message framing, the
//! control family (family name and multicast group resolution), the nl80211
//! family, and a dispatcher that correlates kernel replies with the requests
//! that caused them.
//!
//! # Example
//!
//! ```ignore
//! use nlmux::netlink::genl::nl80211::{self, NL80211_FAMILY_NAME, EVENT_TYPE_SCAN};
//! use nlmux::netlink::{Driver, NetlinkManager, NetlinkSocket};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> nlmux::Result<()> {
//!     let mut manager = NetlinkManager::new(NetlinkSocket::new()?);
//!     manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode)?;
//!     manager.subscribe(NL80211_FAMILY_NAME, EVENT_TYPE_SCAN)?;
//!     manager.add_broadcast_handler(std::rc::Rc::new(|msg| println!("{msg}")))?;
//!
//!     Driver::new(manager)?.run().await
//! }
//! ```

pub mod netlink;

pub use netlink::{Error, NetlinkManager, NetlinkSocket, Result};
