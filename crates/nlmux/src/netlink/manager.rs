//! Request/response correlation over one generic netlink socket.
//!
//! [`NetlinkManager`] owns a [`Transport`] and keeps three tables:
//!
//! - pending requests keyed by sequence number, each holding the handlers
//!   supplied to [`send`](NetlinkManager::send);
//! - broadcast handlers, called in registration order for every message
//!   that answers no pending request;
//! - resolved families (id and multicast groups), filled by
//!   [`resolve_family`](NetlinkManager::resolve_family).
//!
//! Per request:
//!
//! ```text
//!   send ──► Sent ──ACK────────────────► Completed (ack handler decides)
//!             │ ──NLMSG_ERROR──────────► Completed (auxiliary: ErrorFromKernel)
//!             │ ──reply, not MULTI─────► Completed (response handler)
//!             │ ──reply, MULTI─────────► AwaitingMore (response handler)
//!             │                              │ ──NLMSG_DONE──► Completed (auxiliary: Done)
//!             └──expired at next send────────┴──────────────► TimedOut (auxiliary: Timeout)
//! ```
//!
//! The manager is single-threaded. Handlers are plain closures and cannot
//! reach the manager; all mutation happens between dispatches.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

use super::attribute::hex_string;
use super::error::{Error, Result};
use super::genl::control::{ControlMessage, FamilyInfo};
use super::genl::nl80211::{NL80211_FAMILY_NAME, Nl80211Message};
use super::message::{
    Decoder, ErrorAckMessage, GenericNetlinkMessage, ILLEGAL_MESSAGE_TYPE, MessageFactory,
    NLM_F_ACK, NLMSG_HDRLEN, NetlinkMessage, NlMsgHdr, nlmsg_align,
};
use super::socket::{DEFAULT_RECV_BUFFER_SIZE, Transport};

/// How long a request may wait for its reply.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
/// How long [`NetlinkManager::resolve_family`] blocks.
pub const DEFAULT_FAMILY_WAIT: Duration = Duration::from_secs(1);

/// Manager tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Requests older than this are expired by the next send.
    pub response_timeout: Duration,
    /// Deadline for a blocking family lookup.
    pub family_wait: Duration,
    /// Largest datagram read from the socket in one receive.
    pub recv_buffer_size: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            family_wait: DEFAULT_FAMILY_WAIT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_family_wait(mut self, wait: Duration) -> Self {
        self.family_wait = wait;
        self
    }

    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }
}

/// Why the auxiliary handler of a request was called.
#[derive(Debug, Clone, Copy)]
pub enum AuxiliaryMessage<'a> {
    /// The kernel answered with a nonzero NLMSG_ERROR.
    ErrorFromKernel(&'a ErrorAckMessage),
    /// The reply was not of the family the response handler expects.
    UnexpectedResponseType(&'a NetlinkMessage),
    /// No reply arrived within the response timeout.
    Timeout,
    /// NLMSG_DONE ended a multipart reply.
    Done,
}

impl fmt::Display for AuxiliaryMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxiliaryMessage::ErrorFromKernel(err) => write!(f, "kernel error: {err}"),
            AuxiliaryMessage::UnexpectedResponseType(msg) => {
                write!(f, "unexpected response type: {}", msg.kind_name())
            }
            AuxiliaryMessage::Timeout => f.write_str("timed out"),
            AuxiliaryMessage::Done => f.write_str("done"),
        }
    }
}

/// What to do with a request once its ACK arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckAction {
    /// Forget the request.
    #[default]
    Complete,
    /// Keep the request registered; a data reply follows.
    AwaitResponse,
}

pub type AckHandler = Box<dyn FnMut() -> AckAction>;
pub type AuxiliaryHandler = Box<dyn FnMut(AuxiliaryMessage<'_>)>;

/// Called for every unsolicited message. Identity is the `Rc` allocation.
pub type BroadcastHandler = Rc<dyn Fn(&NetlinkMessage)>;

/// Receives the data replies of one request.
pub enum ResponseHandler {
    /// Control family replies only.
    Control(Box<dyn FnMut(&ControlMessage)>),
    /// nl80211 replies only.
    Nl80211(Box<dyn FnMut(&Nl80211Message)>),
    /// Any reply.
    Any(Box<dyn FnMut(&NetlinkMessage)>),
}

impl ResponseHandler {
    /// Invoke the handler if `msg` is of the expected family.
    fn invoke(&mut self, msg: &NetlinkMessage) -> bool {
        match (self, msg) {
            (ResponseHandler::Control(handler), NetlinkMessage::Control(ctrl)) => handler(ctrl),
            (ResponseHandler::Nl80211(handler), NetlinkMessage::Nl80211(nl)) => handler(nl),
            (ResponseHandler::Any(handler), msg) => handler(msg),
            _ => return false,
        }
        true
    }

    fn expected(&self) -> &'static str {
        match self {
            ResponseHandler::Control(_) => "Control",
            ResponseHandler::Nl80211(_) => "Nl80211",
            ResponseHandler::Any(_) => "any",
        }
    }
}

impl fmt::Debug for ResponseHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResponseHandler({})", self.expected())
    }
}

/// Handlers attached to one request.
///
/// ```ignore
/// let handlers = RequestHandlers::new()
///     .on_nl80211(|msg| println!("{msg}"))
///     .on_auxiliary(|aux| eprintln!("wiphy dump: {aux}"));
/// ```
#[derive(Default)]
pub struct RequestHandlers {
    response: Option<ResponseHandler>,
    ack: Option<AckHandler>,
    auxiliary: Option<AuxiliaryHandler>,
}

impl RequestHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_control(mut self, handler: impl FnMut(&ControlMessage) + 'static) -> Self {
        self.response = Some(ResponseHandler::Control(Box::new(handler)));
        self
    }

    pub fn on_nl80211(mut self, handler: impl FnMut(&Nl80211Message) + 'static) -> Self {
        self.response = Some(ResponseHandler::Nl80211(Box::new(handler)));
        self
    }

    pub fn on_any(mut self, handler: impl FnMut(&NetlinkMessage) + 'static) -> Self {
        self.response = Some(ResponseHandler::Any(Box::new(handler)));
        self
    }

    /// Handle the ACK. Setting this also asks the kernel for one.
    pub fn on_ack(mut self, handler: impl FnMut() -> AckAction + 'static) -> Self {
        self.ack = Some(Box::new(handler));
        self
    }

    pub fn on_auxiliary(mut self, handler: impl FnMut(AuxiliaryMessage<'_>) + 'static) -> Self {
        self.auxiliary = Some(Box::new(handler));
        self
    }

    fn is_empty(&self) -> bool {
        self.response.is_none() && self.ack.is_none() && self.auxiliary.is_none()
    }
}

impl fmt::Debug for RequestHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandlers")
            .field("response", &self.response)
            .field("ack", &self.ack.is_some())
            .field("auxiliary", &self.auxiliary.is_some())
            .finish()
    }
}

struct PendingRequest {
    handlers: RequestHandlers,
    expires: Instant,
}

impl PendingRequest {
    fn notify(&mut self, aux: AuxiliaryMessage<'_>) {
        match self.handlers.auxiliary.as_mut() {
            Some(handler) => handler(aux),
            None => tracing::debug!(%aux, "no auxiliary handler"),
        }
    }
}

/// Outcome of a family lookup in flight.
enum Resolution {
    Waiting,
    Found(FamilyInfo),
    Failed(Error),
}

/// Generic netlink request dispatcher.
pub struct NetlinkManager<T: Transport> {
    transport: T,
    config: ManagerConfig,
    factory: MessageFactory,
    pending: BTreeMap<u32, PendingRequest>,
    broadcast_handlers: Vec<BroadcastHandler>,
    families: HashMap<String, FamilyInfo>,
}

impl<T: Transport> NetlinkManager<T> {
    /// A manager with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ManagerConfig::default())
    }

    pub fn with_config(mut transport: T, config: ManagerConfig) -> Self {
        transport.set_recv_buffer_size(config.recv_buffer_size);
        Self {
            transport,
            config,
            factory: MessageFactory::new(),
            pending: BTreeMap::new(),
            broadcast_handlers: Vec::new(),
            families: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Number of requests still waiting for a reply.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Whether a request with this sequence number is still pending.
    pub fn is_pending(&self, seq: u32) -> bool {
        self.pending.contains_key(&seq)
    }

    /// Send `message` and register `handlers` under its new sequence number.
    ///
    /// Expired requests are swept first. Nothing is registered if encoding
    /// fails, the sequence number is already taken, or the write fails.
    pub fn send(
        &mut self,
        message: &mut GenericNetlinkMessage,
        handlers: RequestHandlers,
    ) -> Result<u32> {
        self.sweep_expired();

        let seq = self.transport.next_seq();
        if self.pending.contains_key(&seq) {
            tracing::error!(seq, "handler already registered for sequence");
            return Err(Error::DuplicateSequence { seq });
        }
        if handlers.ack.is_some() {
            message.add_flag(NLM_F_ACK);
        }
        let bytes = message.encode(seq)?;

        let registered = !handlers.is_empty();
        if registered {
            let expires = Instant::now() + self.config.response_timeout;
            self.pending.insert(seq, PendingRequest { handlers, expires });
        }

        tracing::debug!(
            seq,
            message_type = message.message_type(),
            command = message.command,
            registered,
            "sending request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(seq, bytes = %hex_string(&bytes), "outgoing datagram");
        }

        if let Err(e) = self.transport.send(&bytes) {
            tracing::error!(seq, error = %e, "failed to send netlink message");
            self.pending.remove(&seq);
            return Err(e);
        }
        Ok(seq)
    }

    /// Send a control family request.
    pub fn send_control(
        &mut self,
        message: &mut ControlMessage,
        handlers: RequestHandlers,
    ) -> Result<u32> {
        self.send(message, handlers)
    }

    /// Send an nl80211 request, filling in the resolved family id.
    pub fn send_nl80211(
        &mut self,
        message: &mut Nl80211Message,
        handlers: RequestHandlers,
    ) -> Result<u32> {
        let id = self
            .families
            .get(NL80211_FAMILY_NAME)
            .map(|family| family.id)
            .ok_or_else(|| Error::FamilyNotResolved {
                name: NL80211_FAMILY_NAME.to_string(),
            })?;
        message.set_message_type(id);
        self.send(message, handlers)
    }

    /// Stop waiting for the reply to `seq`. Kernel-side state is untouched.
    pub fn remove_message_handler(&mut self, seq: u32) -> bool {
        let removed = self.pending.remove(&seq).is_some();
        if !removed {
            tracing::debug!(seq, "no pending request to remove");
        }
        removed
    }

    fn sweep_expired(&mut self) {
        let now = Instant::now();
        let expired: Vec<u32> = self
            .pending
            .iter()
            .filter(|(_, request)| now > request.expires)
            .map(|(seq, _)| *seq)
            .collect();
        for seq in expired {
            if let Some(mut request) = self.pending.remove(&seq) {
                tracing::debug!(seq, "request timed out");
                request.notify(AuxiliaryMessage::Timeout);
            }
        }
    }

    pub fn add_broadcast_handler(&mut self, handler: BroadcastHandler) -> Result<()> {
        if self.find_broadcast_handler(&handler) {
            tracing::warn!("trying to re-add a broadcast handler");
            return Err(Error::DuplicateHandler);
        }
        self.broadcast_handlers.push(handler);
        Ok(())
    }

    pub fn remove_broadcast_handler(&mut self, handler: &BroadcastHandler) -> Result<()> {
        let before = self.broadcast_handlers.len();
        self.broadcast_handlers
            .retain(|existing| !Rc::ptr_eq(existing, handler));
        if self.broadcast_handlers.len() == before {
            tracing::warn!("broadcast handler not registered");
            return Err(Error::HandlerNotFound);
        }
        Ok(())
    }

    pub fn find_broadcast_handler(&self, handler: &BroadcastHandler) -> bool {
        self.broadcast_handlers
            .iter()
            .any(|existing| Rc::ptr_eq(existing, handler))
    }

    pub fn clear_broadcast_handlers(&mut self) {
        self.broadcast_handlers.clear();
    }

    /// A family resolved earlier.
    pub fn family(&self, name: &str) -> Option<&FamilyInfo> {
        self.families.get(name)
    }

    /// Look up the id of family `name`, registering `decoder` for it.
    ///
    /// Cached ids return immediately. Otherwise this sends
    /// `CTRL_CMD_GETFAMILY` and blocks for up to the configured family wait,
    /// dispatching everything else that arrives meanwhile. Returns
    /// [`ILLEGAL_MESSAGE_TYPE`] if no answer arrives in time.
    pub fn resolve_family(&mut self, name: &str, decoder: Decoder) -> Result<u16> {
        if let Some(family) = self.families.get(name) {
            return Ok(family.id);
        }

        let state = Rc::new(RefCell::new(Resolution::Waiting));
        let on_reply = Rc::clone(&state);
        let on_error = Rc::clone(&state);
        let handlers = RequestHandlers::new()
            .on_control(move |msg| match msg.family_info() {
                Some(info) => *on_reply.borrow_mut() = Resolution::Found(info),
                None => tracing::warn!("CTRL_CMD_NEWFAMILY without id or name"),
            })
            .on_auxiliary(move |aux| {
                if let AuxiliaryMessage::ErrorFromKernel(err) = aux
                    && let Some(error) = err.to_error()
                {
                    *on_error.borrow_mut() = Resolution::Failed(error);
                }
            });

        let mut request = ControlMessage::get_family(name);
        let seq = self.send_control(&mut request, handlers)?;

        let deadline = std::time::Instant::now() + self.config.family_wait;
        loop {
            if !matches!(*state.borrow(), Resolution::Waiting) {
                break;
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                break;
            }
            if let Some(data) = self.transport.recv_timeout(deadline - now)? {
                self.on_raw_receive(&data);
            }
        }
        self.pending.remove(&seq);

        match state.replace(Resolution::Waiting) {
            Resolution::Found(info) => {
                let id = info.id;
                tracing::debug!(family = %info.name, id, groups = info.mcast_groups.len(), "resolved family");
                self.factory.add(id, decoder);
                self.families.insert(name.to_string(), info);
                Ok(id)
            }
            Resolution::Failed(error) => {
                tracing::warn!(family = name, %error, "family lookup refused");
                Err(error)
            }
            Resolution::Waiting => {
                tracing::warn!(family = name, "timed out waiting for family id");
                Ok(ILLEGAL_MESSAGE_TYPE)
            }
        }
    }

    /// Join multicast `group` of an already resolved `family`.
    pub fn subscribe(&mut self, family: &str, group: &str) -> Result<()> {
        let Some(info) = self.families.get(family) else {
            tracing::warn!(family, "family doesn't exist");
            return Err(Error::UnknownFamily {
                name: family.to_string(),
            });
        };
        let Some(group_id) = info.group(group) else {
            tracing::warn!(family, group, "group doesn't exist in family");
            return Err(Error::UnknownGroup {
                family: family.to_string(),
                group: group.to_string(),
            });
        };
        self.transport.add_membership(group_id)?;
        tracing::debug!(family, group, group_id, "subscribed");
        Ok(())
    }

    /// Split one socket read into datagrams and dispatch each.
    ///
    /// Stops at the first truncated datagram. A datagram that fails to
    /// decode is skipped.
    pub fn on_raw_receive(&mut self, data: &[u8]) {
        let mut offset = 0;
        while offset < data.len() {
            let remaining = &data[offset..];
            let Ok(hdr) = NlMsgHdr::from_bytes(remaining) else {
                tracing::error!(bytes_left = remaining.len(), "discarding partial netlink header");
                return;
            };
            let len = hdr.nlmsg_len as usize;
            if len < NLMSG_HDRLEN || len > remaining.len() {
                tracing::error!(
                    bytes_left = remaining.len(),
                    declared = len,
                    "discarding truncated netlink message"
                );
                return;
            }

            let datagram = &remaining[..len];
            if tracing::enabled!(tracing::Level::TRACE) {
                tracing::trace!(bytes = %hex_string(datagram), "incoming datagram");
            }
            match self.factory.create(datagram) {
                Ok(msg) => self.dispatch(msg),
                Err(e) => tracing::error!(error = %e, "failed to decode netlink message"),
            }
            offset += nlmsg_align(len);
        }
    }

    fn dispatch(&mut self, msg: NetlinkMessage) {
        let seq = msg.sequence_number();
        let Some(mut request) = self.pending.remove(&seq) else {
            self.broadcast(&msg);
            return;
        };

        let keep = match &msg {
            NetlinkMessage::ErrorAck(ack) if ack.is_ack() => match request.handlers.ack.as_mut() {
                Some(handler) => handler() == AckAction::AwaitResponse,
                None => false,
            },
            NetlinkMessage::ErrorAck(err) => {
                tracing::debug!(seq, error = err.error, "kernel error for request");
                request.notify(AuxiliaryMessage::ErrorFromKernel(err));
                false
            }
            NetlinkMessage::Done(_) => {
                request.notify(AuxiliaryMessage::Done);
                false
            }
            reply => {
                let delivered = request
                    .handlers
                    .response
                    .as_mut()
                    .map(|handler| (handler.invoke(reply), handler.expected()));
                match delivered {
                    Some((true, _)) => {}
                    Some((false, expected)) => {
                        tracing::warn!(
                            seq,
                            expected,
                            got = reply.kind_name(),
                            "response handler type mismatch"
                        );
                        request.notify(AuxiliaryMessage::UnexpectedResponseType(reply));
                    }
                    None => tracing::debug!(seq, "no response handler for reply"),
                }
                reply.is_multi()
            }
        };

        if keep {
            tracing::debug!(seq, "keeping request for further replies");
            self.pending.insert(seq, request);
        }
    }

    fn broadcast(&self, msg: &NetlinkMessage) {
        if self.broadcast_handlers.is_empty() {
            tracing::debug!(seq = msg.sequence_number(), kind = msg.kind_name(), "unhandled message");
        }
        for handler in &self.broadcast_handlers {
            handler(msg);
        }
    }

    /// Drop every pending request, broadcast handler and resolved family.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.broadcast_handlers.clear();
        self.families.clear();
        self.factory = MessageFactory::new();
    }
}

impl<T: Transport + AsRawFd> AsRawFd for NetlinkManager<T> {
    fn as_raw_fd(&self) -> RawFd {
        self.transport.as_raw_fd()
    }
}

impl<T: Transport> fmt::Debug for NetlinkManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetlinkManager")
            .field("pid", &self.transport.pid())
            .field("config", &self.config)
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .field("broadcast_handlers", &self.broadcast_handlers.len())
            .field("families", &self.families.keys().collect::<Vec<_>>())
            .finish()
    }
}
