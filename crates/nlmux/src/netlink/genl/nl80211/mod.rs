//! nl80211, the WiFi configuration and event family.
//!
//! The family id is assigned by the kernel and resolved at runtime through
//! the control family. Every message is a [`Nl80211Message`]: the command
//! byte selects a [`Nl80211Command`], and the command's registration entry
//! decides how the top-level attributes are interpreted.

pub mod attrs;
pub mod frame;
pub mod ieee80211;
mod message;

pub use attrs::{BssAttr, Nl80211Attr, WowlanTrigger};
pub use frame::{FrameType, Nl80211Frame};
pub use message::Nl80211Message;

use crate::netlink::attribute::AttributeList;
use crate::netlink::error::Result;
use crate::netlink::message::{GenericNetlinkMessage, MessageHeader, NetlinkMessage};
use crate::netlink::schema::AttrSpec;

/// Generic netlink family name.
pub const NL80211_FAMILY_NAME: &str = "nl80211";

// Multicast groups of the nl80211 family.
pub const EVENT_TYPE_CONFIG: &str = "config";
pub const EVENT_TYPE_SCAN: &str = "scan";
pub const EVENT_TYPE_REGULATORY: &str = "regulatory";
pub const EVENT_TYPE_MLME: &str = "mlme";

/// All multicast groups, in subscription order.
pub const EVENT_TYPES: [&str; 4] = [
    EVENT_TYPE_CONFIG,
    EVENT_TYPE_SCAN,
    EVENT_TYPE_REGULATORY,
    EVENT_TYPE_MLME,
];

/// Registration entry for one command.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Kernel-style name, e.g. `NL80211_CMD_DISCONNECT`.
    pub name: &'static str,
    /// Attribute declarations that replace the family-wide ones for this
    /// command.
    pub attributes: &'static [AttrSpec],
}

impl CommandSpec {
    const fn named(name: &'static str) -> Self {
        Self {
            name,
            attributes: &[],
        }
    }

    /// Resolve a top-level attribute id for this command.
    pub fn lookup(&self, id: u16) -> Option<&'static AttrSpec> {
        self.attributes
            .iter()
            .find(|spec| spec.id == id)
            .or_else(|| attrs::lookup(id))
    }
}

macro_rules! nl80211_commands {
    ($($variant:ident = $value:literal => $name:literal),+ $(,)?) => {
        /// nl80211 commands (`enum nl80211_commands`).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Nl80211Command {
            $($variant,)+
            /// A command byte this crate has no entry for.
            Unknown(u8),
        }

        impl Nl80211Command {
            pub fn from_u8(cmd: u8) -> Self {
                match cmd {
                    $($value => Nl80211Command::$variant,)+
                    other => Nl80211Command::Unknown(other),
                }
            }

            pub fn as_u8(self) -> u8 {
                match self {
                    $(Nl80211Command::$variant => $value,)+
                    Nl80211Command::Unknown(other) => other,
                }
            }

            fn default_spec(self) -> CommandSpec {
                match self {
                    $(Nl80211Command::$variant => CommandSpec::named($name),)+
                    Nl80211Command::Unknown(_) => CommandSpec::named("<UNKNOWN NL80211 MESSAGE>"),
                }
            }
        }
    };
}

nl80211_commands! {
    Unspec = 0 => "NL80211_CMD_UNSPEC",
    GetWiphy = 1 => "NL80211_CMD_GET_WIPHY",
    SetWiphy = 2 => "NL80211_CMD_SET_WIPHY",
    NewWiphy = 3 => "NL80211_CMD_NEW_WIPHY",
    DelWiphy = 4 => "NL80211_CMD_DEL_WIPHY",
    GetInterface = 5 => "NL80211_CMD_GET_INTERFACE",
    SetInterface = 6 => "NL80211_CMD_SET_INTERFACE",
    NewInterface = 7 => "NL80211_CMD_NEW_INTERFACE",
    DelInterface = 8 => "NL80211_CMD_DEL_INTERFACE",
    GetKey = 9 => "NL80211_CMD_GET_KEY",
    SetKey = 10 => "NL80211_CMD_SET_KEY",
    NewKey = 11 => "NL80211_CMD_NEW_KEY",
    DelKey = 12 => "NL80211_CMD_DEL_KEY",
    GetBeacon = 13 => "NL80211_CMD_GET_BEACON",
    SetBeacon = 14 => "NL80211_CMD_SET_BEACON",
    StartAp = 15 => "NL80211_CMD_START_AP",
    StopAp = 16 => "NL80211_CMD_STOP_AP",
    GetStation = 17 => "NL80211_CMD_GET_STATION",
    SetStation = 18 => "NL80211_CMD_SET_STATION",
    NewStation = 19 => "NL80211_CMD_NEW_STATION",
    DelStation = 20 => "NL80211_CMD_DEL_STATION",
    GetMpath = 21 => "NL80211_CMD_GET_MPATH",
    SetMpath = 22 => "NL80211_CMD_SET_MPATH",
    NewMpath = 23 => "NL80211_CMD_NEW_MPATH",
    DelMpath = 24 => "NL80211_CMD_DEL_MPATH",
    SetBss = 25 => "NL80211_CMD_SET_BSS",
    SetReg = 26 => "NL80211_CMD_SET_REG",
    ReqSetReg = 27 => "NL80211_CMD_REQ_SET_REG",
    GetMeshConfig = 28 => "NL80211_CMD_GET_MESH_CONFIG",
    SetMeshConfig = 29 => "NL80211_CMD_SET_MESH_CONFIG",
    SetMgmtExtraIe = 30 => "NL80211_CMD_SET_MGMT_EXTRA_IE",
    GetReg = 31 => "NL80211_CMD_GET_REG",
    GetScan = 32 => "NL80211_CMD_GET_SCAN",
    TriggerScan = 33 => "NL80211_CMD_TRIGGER_SCAN",
    NewScanResults = 34 => "NL80211_CMD_NEW_SCAN_RESULTS",
    ScanAborted = 35 => "NL80211_CMD_SCAN_ABORTED",
    RegChange = 36 => "NL80211_CMD_REG_CHANGE",
    Authenticate = 37 => "NL80211_CMD_AUTHENTICATE",
    Associate = 38 => "NL80211_CMD_ASSOCIATE",
    Deauthenticate = 39 => "NL80211_CMD_DEAUTHENTICATE",
    Disassociate = 40 => "NL80211_CMD_DISASSOCIATE",
    MichaelMicFailure = 41 => "NL80211_CMD_MICHAEL_MIC_FAILURE",
    RegBeaconHint = 42 => "NL80211_CMD_REG_BEACON_HINT",
    JoinIbss = 43 => "NL80211_CMD_JOIN_IBSS",
    LeaveIbss = 44 => "NL80211_CMD_LEAVE_IBSS",
    Testmode = 45 => "NL80211_CMD_TESTMODE",
    Connect = 46 => "NL80211_CMD_CONNECT",
    Roam = 47 => "NL80211_CMD_ROAM",
    Disconnect = 48 => "NL80211_CMD_DISCONNECT",
    SetWiphyNetns = 49 => "NL80211_CMD_SET_WIPHY_NETNS",
    GetSurvey = 50 => "NL80211_CMD_GET_SURVEY",
    NewSurveyResults = 51 => "NL80211_CMD_NEW_SURVEY_RESULTS",
    SetPmksa = 52 => "NL80211_CMD_SET_PMKSA",
    DelPmksa = 53 => "NL80211_CMD_DEL_PMKSA",
    FlushPmksa = 54 => "NL80211_CMD_FLUSH_PMKSA",
    RemainOnChannel = 55 => "NL80211_CMD_REMAIN_ON_CHANNEL",
    CancelRemainOnChannel = 56 => "NL80211_CMD_CANCEL_REMAIN_ON_CHANNEL",
    SetTxBitrateMask = 57 => "NL80211_CMD_SET_TX_BITRATE_MASK",
    RegisterFrame = 58 => "NL80211_CMD_REGISTER_FRAME",
    Frame = 59 => "NL80211_CMD_FRAME",
    FrameTxStatus = 60 => "NL80211_CMD_FRAME_TX_STATUS",
    SetPowerSave = 61 => "NL80211_CMD_SET_POWER_SAVE",
    GetPowerSave = 62 => "NL80211_CMD_GET_POWER_SAVE",
    SetCqm = 63 => "NL80211_CMD_SET_CQM",
    NotifyCqm = 64 => "NL80211_CMD_NOTIFY_CQM",
    SetChannel = 65 => "NL80211_CMD_SET_CHANNEL",
    SetWdsPeer = 66 => "NL80211_CMD_SET_WDS_PEER",
    FrameWaitCancel = 67 => "NL80211_CMD_FRAME_WAIT_CANCEL",
    JoinMesh = 68 => "NL80211_CMD_JOIN_MESH",
    LeaveMesh = 69 => "NL80211_CMD_LEAVE_MESH",
    UnprotDeauthenticate = 70 => "NL80211_CMD_UNPROT_DEAUTHENTICATE",
    UnprotDisassociate = 71 => "NL80211_CMD_UNPROT_DISASSOCIATE",
    NewPeerCandidate = 72 => "NL80211_CMD_NEW_PEER_CANDIDATE",
    GetWowlan = 73 => "NL80211_CMD_GET_WOWLAN",
    SetWowlan = 74 => "NL80211_CMD_SET_WOWLAN",
    StartSchedScan = 75 => "NL80211_CMD_START_SCHED_SCAN",
    StopSchedScan = 76 => "NL80211_CMD_STOP_SCHED_SCAN",
    SchedScanResults = 77 => "NL80211_CMD_SCHED_SCAN_RESULTS",
    SchedScanStopped = 78 => "NL80211_CMD_SCHED_SCAN_STOPPED",
    SetRekeyOffload = 79 => "NL80211_CMD_SET_REKEY_OFFLOAD",
    PmksaCandidate = 80 => "NL80211_CMD_PMKSA_CANDIDATE",
}

impl Nl80211Command {
    /// Registration entry: name plus per-command attribute overrides.
    pub fn spec(self) -> CommandSpec {
        let spec = self.default_spec();
        match self {
            // A SET_WOWLAN event reports why the system woke up.
            Nl80211Command::SetWowlan => CommandSpec {
                attributes: &attrs::WAKE_REASON_ATTRIBUTES,
                ..spec
            },
            _ => spec,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl From<u8> for Nl80211Command {
    fn from(cmd: u8) -> Self {
        Nl80211Command::from_u8(cmd)
    }
}

/// [`Decoder`](crate::netlink::message::Decoder) for the nl80211 family.
pub fn decode(header: MessageHeader, payload: &[u8]) -> Result<NetlinkMessage> {
    let (genl, attrs) = GenericNetlinkMessage::split_payload(payload)?;
    let command = Nl80211Command::from_u8(genl.cmd);
    if let Nl80211Command::Unknown(cmd) = command {
        tracing::debug!(cmd, "unknown nl80211 command");
    }
    let spec = command.spec();
    let attributes = AttributeList::decode_with(attrs, false, |id| spec.lookup(id));
    Ok(NetlinkMessage::Nl80211(Nl80211Message::from_parts(
        GenericNetlinkMessage {
            header,
            command: genl.cmd,
            attributes,
        },
    )))
}
