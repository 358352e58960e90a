//! nlmon wiphy - dump wireless PHYs with NL80211_CMD_GET_WIPHY.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{anyhow, bail};
use clap::Args;
use nlmux::netlink::genl::nl80211::attrs::Nl80211Attr;
use nlmux::netlink::genl::nl80211::{Nl80211Command, Nl80211Message};
use nlmux::netlink::message::NLM_F_DUMP;
use nlmux::netlink::{AuxiliaryMessage, Driver, NetlinkManager, NetlinkSocket, RequestHandlers};

use super::resolve_nl80211;

#[derive(Args)]
pub struct WiphyCmd {
    /// Print every attribute of each reply.
    #[arg(short, long)]
    details: bool,
}

impl WiphyCmd {
    pub async fn run(&self, mut manager: NetlinkManager<NetlinkSocket>) -> anyhow::Result<()> {
        resolve_nl80211(&mut manager)?;

        let done = Rc::new(Cell::new(false));
        let failure = Rc::new(RefCell::new(None));
        let details = self.details;

        let finished = Rc::clone(&done);
        let failed = Rc::clone(&failure);
        let handlers = RequestHandlers::new()
            .on_nl80211(move |wiphy| print_wiphy(wiphy, details))
            .on_auxiliary(move |aux| {
                if !matches!(aux, AuxiliaryMessage::Done) {
                    *failed.borrow_mut() = Some(aux.to_string());
                }
                finished.set(true);
            });

        let mut request = Nl80211Message::new(Nl80211Command::GetWiphy);
        request.add_flag(NLM_F_DUMP);
        manager.send_nl80211(&mut request, handlers)?;

        let timeout = manager.config().response_timeout;
        let mut driver = Driver::new(manager)?;
        tokio::time::timeout(timeout, async {
            while !done.get() {
                driver.process_ready().await?;
            }
            Ok::<_, nlmux::Error>(())
        })
        .await
        .map_err(|_| anyhow!("timed out waiting for the wiphy dump"))??;

        if let Some(reason) = failure.borrow_mut().take() {
            bail!("wiphy dump failed: {reason}");
        }
        Ok(())
    }
}

fn print_wiphy(wiphy: &Nl80211Message, details: bool) {
    let attrs = wiphy.attributes();
    let index = attrs.get::<u32>(Nl80211Attr::Wiphy as u16);
    let name = attrs.get_str(Nl80211Attr::WiphyName as u16).unwrap_or("?");
    match index {
        Some(index) => println!("phy#{index}: {name}"),
        None => println!("phy: {name}"),
    }
    if details {
        println!("{wiphy}");
    }
}
