//! Generic Netlink (GENL) families.
//!
//! Generic Netlink extends the standard netlink protocol with:
//! - Dynamic family ID allocation (resolved via the control family)
//! - Family-specific commands and attributes
//! - Multicast group support per family
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ ControlMessage / Nl80211Message         │
//! │ (family commands, attribute schemas)    │
//! └────────────────┬────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────┐
//! │ GenericNetlinkMessage                   │
//! │ (nlmsghdr + genlmsghdr + attributes)    │
//! └────────────────┬────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────┐
//! │ NetlinkManager (family table, dispatch) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use nlmux::netlink::genl::nl80211::{self, NL80211_FAMILY_NAME};
//! use nlmux::netlink::{NetlinkManager, NetlinkSocket};
//!
//! # fn example() -> nlmux::Result<()> {
//! let mut manager = NetlinkManager::new(NetlinkSocket::new()?);
//!
//! let id = manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode)?;
//! println!("nl80211 family ID: {id}");
//! manager.subscribe(NL80211_FAMILY_NAME, "scan")?;
//! # Ok(())
//! # }
//! ```

pub mod control;
pub mod header;
pub mod nl80211;

pub use control::{ControlMessage, CtrlAttr, CtrlCmd, FamilyInfo, GENL_ID_CTRL};
pub use header::{GENL_HDRLEN, GenlMsgHdr};
pub use nl80211::{Nl80211Command, Nl80211Message};
