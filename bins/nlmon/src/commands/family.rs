//! nlmon family - resolve a family name to its id and multicast groups.

use anyhow::bail;
use clap::Args;
use nlmux::netlink::genl::nl80211::{self, NL80211_FAMILY_NAME};
use nlmux::netlink::message::{Decoder, ILLEGAL_MESSAGE_TYPE, decode_opaque};
use nlmux::netlink::{NetlinkManager, NetlinkSocket};

#[derive(Args)]
pub struct FamilyCmd {
    /// Family name (e.g. nl80211, nlctrl, devlink).
    name: String,
}

impl FamilyCmd {
    pub fn run(&self, mut manager: NetlinkManager<NetlinkSocket>) -> anyhow::Result<()> {
        let decoder: Decoder = if self.name == NL80211_FAMILY_NAME {
            nl80211::decode
        } else {
            decode_opaque
        };
        let id = manager.resolve_family(&self.name, decoder)?;
        if id == ILLEGAL_MESSAGE_TYPE {
            bail!("timed out resolving family '{}'", self.name);
        }

        let Some(family) = manager.family(&self.name) else {
            bail!("family '{}' missing after lookup", self.name);
        };
        println!("{}: id {} version {}", family.name, family.id, family.version);

        let mut groups: Vec<_> = family.mcast_groups.iter().collect();
        groups.sort_by_key(|(_, id)| **id);
        for (name, id) in groups {
            println!("    group {name}: {id}");
        }
        Ok(())
    }
}
