//! Subcommand implementations.

pub mod family;
pub mod monitor;
pub mod wiphy;

use anyhow::bail;
use nlmux::netlink::genl::nl80211::{self, NL80211_FAMILY_NAME};
use nlmux::netlink::message::ILLEGAL_MESSAGE_TYPE;
use nlmux::netlink::{NetlinkManager, NetlinkSocket};

/// Resolve nl80211 or fail with a readable error.
pub fn resolve_nl80211(manager: &mut NetlinkManager<NetlinkSocket>) -> anyhow::Result<u16> {
    let id = manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode)?;
    if id == ILLEGAL_MESSAGE_TYPE {
        bail!("no reply resolving {NL80211_FAMILY_NAME}; is cfg80211 loaded?");
    }
    Ok(id)
}
