//! Tokio event loop integration.
//!
//! The manager is synchronous; [`Driver`] registers its socket with the
//! tokio reactor and feeds every readable datagram to
//! [`NetlinkManager::on_raw_receive`].
//!
//! # Example
//!
//! ```ignore
//! use nlmux::netlink::driver::{self, Driver};
//! use tokio_stream::StreamExt;
//!
//! let mut manager = NetlinkManager::new(NetlinkSocket::new()?);
//! manager.resolve_family(NL80211_FAMILY_NAME, nl80211::decode)?;
//! manager.subscribe(NL80211_FAMILY_NAME, EVENT_TYPE_MLME)?;
//!
//! let (_handler, mut events) = driver::broadcast_events(&mut manager)?;
//! let mut driver = Driver::new(manager)?;
//! loop {
//!     tokio::select! {
//!         res = driver.process_ready() => { res?; }
//!         Some(msg) = events.next() => println!("{msg}"),
//!     }
//! }
//! ```

use std::io;
use std::os::unix::io::AsRawFd;
use std::rc::Rc;

use tokio::io::unix::AsyncFd;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::error::Result;
use super::manager::{BroadcastHandler, NetlinkManager};
use super::message::NetlinkMessage;
use super::socket::Transport;

/// Stream of unsolicited messages.
pub type BroadcastStream = UnboundedReceiverStream<NetlinkMessage>;

/// A manager whose socket is registered with the tokio reactor.
pub struct Driver<T: Transport + AsRawFd> {
    fd: AsyncFd<NetlinkManager<T>>,
}

impl<T: Transport + AsRawFd> Driver<T> {
    /// Register the manager's socket. Must be called inside a tokio runtime.
    pub fn new(manager: NetlinkManager<T>) -> Result<Self> {
        Ok(Self {
            fd: AsyncFd::new(manager)?,
        })
    }

    pub fn manager(&self) -> &NetlinkManager<T> {
        self.fd.get_ref()
    }

    pub fn manager_mut(&mut self) -> &mut NetlinkManager<T> {
        self.fd.get_mut()
    }

    /// Wait for the socket to become readable, then drain it.
    ///
    /// Returns the number of reads dispatched.
    pub async fn process_ready(&mut self) -> Result<usize> {
        let mut guard = self.fd.readable_mut().await?;
        let mut reads = 0;
        loop {
            match guard.try_io(|inner| inner.get_mut().transport_mut().try_recv()) {
                Ok(Ok(data)) => {
                    guard.get_mut().get_mut().on_raw_receive(&data);
                    reads += 1;
                }
                Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Ok(Err(e)) => return Err(e.into()),
                Err(_would_block) => return Ok(reads),
            }
        }
    }

    /// Dispatch incoming messages until the socket fails.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let reads = self.process_ready().await?;
            tracing::trace!(reads, "drained netlink socket");
        }
    }

    pub fn into_inner(self) -> NetlinkManager<T> {
        self.fd.into_inner()
    }
}

/// Forward owned copies of every unsolicited message into a stream.
///
/// Pass the returned handler to
/// [`NetlinkManager::remove_broadcast_handler`] to stop forwarding.
pub fn broadcast_events<T: Transport>(
    manager: &mut NetlinkManager<T>,
) -> Result<(BroadcastHandler, BroadcastStream)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler: BroadcastHandler = Rc::new(move |msg: &NetlinkMessage| {
        if tx.send(msg.clone()).is_err() {
            tracing::trace!("broadcast stream dropped");
        }
    });
    manager.add_broadcast_handler(Rc::clone(&handler))?;
    Ok((handler, UnboundedReceiverStream::new(rx)))
}
