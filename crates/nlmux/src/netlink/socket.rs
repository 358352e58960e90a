//! Low-level netlink socket operations.

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};

use super::error::{Error, Result};
use super::message::BROADCAST_SEQUENCE;

/// Default receive buffer size.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 32768;

/// What the manager needs from the socket underneath it.
///
/// [`NetlinkSocket`] is the real implementation; tests substitute a scripted
/// one.
pub trait Transport {
    /// Next request sequence number. Never returns [`BROADCAST_SEQUENCE`].
    fn next_seq(&mut self) -> u32;

    /// Local port id.
    fn pid(&self) -> u32;

    /// Write one complete datagram.
    fn send(&mut self, datagram: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for a datagram. `Ok(None)` means nothing arrived.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>>;

    /// Read a datagram without blocking; `WouldBlock` when none is queued.
    fn try_recv(&mut self) -> io::Result<Vec<u8>>;

    /// Join a multicast group.
    fn add_membership(&mut self, group: u32) -> Result<()>;

    /// Largest datagram a single receive returns.
    fn set_recv_buffer_size(&mut self, _size: usize) {}
}

/// Sequence number generator that skips [`BROADCAST_SEQUENCE`] on wrap.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    next: u32,
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next number.
    pub fn next(&mut self) -> u32 {
        if self.next == BROADCAST_SEQUENCE {
            self.next = self.next.wrapping_add(1);
        }
        let seq = self.next;
        self.next = self.next.wrapping_add(1);
        seq
    }
}

/// Non-blocking `NETLINK_GENERIC` socket.
pub struct NetlinkSocket {
    socket: Socket,
    seq: SequenceCounter,
    /// Local port ID (assigned by kernel).
    pid: u32,
    recv_buffer_size: usize,
}

impl NetlinkSocket {
    /// Open and bind a generic netlink socket.
    pub fn new() -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_GENERIC)?;
        socket.set_non_blocking(true)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        // Enable extended ACK for better error messages
        socket.set_ext_ack(true).ok(); // Ignore if not supported

        tracing::debug!(pid, "netlink socket bound");
        Ok(Self {
            socket,
            seq: SequenceCounter::new(),
            pid,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        })
    }

    /// Unsubscribe from a multicast group.
    pub fn drop_membership(&mut self, group: u32) -> Result<()> {
        self.socket.drop_membership(group)?;
        Ok(())
    }

    fn recv_now(&self) -> io::Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(self.recv_buffer_size);
        let n = self.socket.recv(&mut buf, 0)?;
        tracing::trace!(bytes = n, "received datagram");
        Ok(buf.to_vec())
    }

    /// Block in poll(2) until the socket is readable or `timeout` passes.
    fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        let mut pollfd = libc::pollfd {
            fd: self.socket.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = poll_millis(timeout);
        loop {
            // SAFETY: pollfd is a valid, initialized pollfd and nfds is 1.
            let ret = unsafe { libc::poll(&mut pollfd, 1, millis) };
            if ret >= 0 {
                return Ok(ret > 0);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(Error::Io(err));
            }
        }
    }
}

/// poll(2) timeout for `timeout`, rounded up so a sub-millisecond wait still
/// sleeps instead of spinning.
fn poll_millis(timeout: Duration) -> libc::c_int {
    let millis = timeout.as_micros().div_ceil(1000);
    millis.min(libc::c_int::MAX as u128) as libc::c_int
}

impl Transport for NetlinkSocket {
    fn next_seq(&mut self) -> u32 {
        self.seq.next()
    }

    fn pid(&self) -> u32 {
        self.pid
    }

    fn send(&mut self, datagram: &[u8]) -> Result<()> {
        let sent = self.socket.send(datagram, 0)?;
        if sent != datagram.len() {
            return Err(Error::InvalidMessage(format!(
                "short write: sent {} of {} bytes",
                sent,
                datagram.len()
            )));
        }
        tracing::trace!(bytes = sent, "sent datagram");
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        if !self.wait_readable(timeout)? {
            return Ok(None);
        }
        match self.recv_now() {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn try_recv(&mut self) -> io::Result<Vec<u8>> {
        self.recv_now()
    }

    fn add_membership(&mut self, group: u32) -> Result<()> {
        self.socket.add_membership(group)?;
        Ok(())
    }

    fn set_recv_buffer_size(&mut self, size: usize) {
        self.recv_buffer_size = size;
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}
