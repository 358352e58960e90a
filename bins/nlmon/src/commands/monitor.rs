//! nlmon monitor - print nl80211 multicast events until interrupted.

use clap::Args;
use nlmux::netlink::genl::nl80211::{EVENT_TYPES, NL80211_FAMILY_NAME, Nl80211Command};
use nlmux::netlink::genl::nl80211::attrs::Nl80211Attr;
use nlmux::netlink::genl::nl80211::ieee80211::reason_string;
use nlmux::netlink::{Driver, NetlinkManager, NetlinkMessage, NetlinkSocket, driver};
use tokio_stream::StreamExt;

use super::resolve_nl80211;

#[derive(Args)]
pub struct MonitorCmd {
    /// Multicast groups to join (default: config, scan, regulatory, mlme).
    #[arg(short, long = "group")]
    groups: Vec<String>,

    /// Print every attribute of each event.
    #[arg(short, long)]
    details: bool,
}

impl MonitorCmd {
    pub async fn run(&self, mut manager: NetlinkManager<NetlinkSocket>) -> anyhow::Result<()> {
        resolve_nl80211(&mut manager)?;

        let groups: Vec<String> = if self.groups.is_empty() {
            EVENT_TYPES.iter().map(|g| g.to_string()).collect()
        } else {
            self.groups.clone()
        };
        for group in &groups {
            manager.subscribe(NL80211_FAMILY_NAME, group)?;
        }

        let (_handler, mut events) = driver::broadcast_events(&mut manager)?;
        let mut driver = Driver::new(manager)?;
        eprintln!("monitoring {}: {}", NL80211_FAMILY_NAME, groups.join(", "));

        loop {
            tokio::select! {
                res = driver.process_ready() => {
                    res?;
                }
                Some(msg) = events.next() => print_event(&msg, self.details),
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        Ok(())
    }
}

fn print_event(msg: &NetlinkMessage, details: bool) {
    let NetlinkMessage::Nl80211(event) = msg else {
        if details {
            println!("{msg}");
        }
        return;
    };

    let attrs = event.attributes();
    let ifindex = attrs
        .get::<u32>(Nl80211Attr::Ifindex as u16)
        .map_or_else(|| "-".to_string(), |i| i.to_string());
    let command = event.nl80211_command();
    match command {
        Nl80211Command::Disconnect | Nl80211Command::Deauthenticate => {
            let reason = attrs.get::<u16>(Nl80211Attr::ReasonCode as u16).unwrap_or(0);
            let by_ap = attrs.flag(Nl80211Attr::DisconnectedByAp as u16);
            println!(
                "if {ifindex}: {} reason {reason}: {}{}",
                command.name(),
                reason_string(reason),
                if by_ap { " (by AP)" } else { "" }
            );
        }
        _ => match event.frame() {
            Some(frame) => println!("if {ifindex}: {}{frame}", command.name()),
            None => println!("if {ifindex}: {}", command.name()),
        },
    }
    if details {
        println!("{event}");
    }
}
