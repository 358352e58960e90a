//! nl80211 attribute space.
//!
//! Ids follow `include/uapi/linux/nl80211.h`. Only attributes with a known
//! type are declared; anything else decodes as raw bytes.

use crate::netlink::attribute::AttributeList;
use crate::netlink::schema::{AttrKind, AttrSpec, NestedSchema};

/// Top-level nl80211 attributes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nl80211Attr {
    Unspec = 0,
    Wiphy = 1,
    WiphyName = 2,
    Ifindex = 3,
    Ifname = 4,
    Iftype = 5,
    Mac = 6,
    KeyData = 7,
    KeyIdx = 8,
    KeyCipher = 9,
    KeySeq = 10,
    StaInfo = 21,
    WiphyBands = 22,
    SupportedIftypes = 32,
    RegAlpha2 = 33,
    WiphyFreq = 38,
    Ie = 42,
    MaxNumScanSsids = 43,
    ScanFrequencies = 44,
    ScanSsids = 45,
    Generation = 46,
    Bss = 47,
    RegInitiator = 48,
    RegType = 49,
    Frame = 51,
    Ssid = 52,
    AuthType = 53,
    ReasonCode = 54,
    KeyType = 55,
    MaxScanIeLen = 56,
    CipherSuites = 57,
    WiphyRetryShort = 61,
    WiphyRetryLong = 62,
    WiphyFragThreshold = 63,
    WiphyRtsThreshold = 64,
    TimedOut = 65,
    DisconnectedByAp = 71,
    StatusCode = 72,
    ReqIe = 77,
    RespIe = 78,
    SurveyInfo = 84,
    MaxNumPmkids = 86,
    Duration = 87,
    Cookie = 88,
    WiphyCoverageClass = 89,
    Ack = 92,
    Cqm = 94,
    ControlPortEthertype = 102,
    SupportIbssRsn = 104,
    WiphyAntennaTx = 105,
    WiphyAntennaRx = 106,
    OffchannelTxOk = 108,
    MaxRemainOnChannelDuration = 111,
    WiphyAntennaAvailTx = 113,
    WiphyAntennaAvailRx = 114,
    SupportMeshAuth = 115,
    WowlanTriggers = 117,
    WowlanTriggersSupported = 118,
    MaxNumSchedScanSsids = 123,
    MaxSchedScanIeLen = 124,
    SupportApUapsd = 130,
    RoamSupport = 131,
    MaxMatchSets = 133,
    PmksaCandidate = 134,
    TdlsSupport = 139,
    TdlsExternalSetup = 140,
    DeviceApSme = 141,
    FeatureFlags = 143,
    ProbeRespOffload = 144,
    HtCapabilityMask = 148,
}

/// `NL80211_BSS_*` attributes nested in [`Nl80211Attr::Bss`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BssAttr {
    Invalid = 0,
    Bssid = 1,
    Frequency = 2,
    Tsf = 3,
    BeaconInterval = 4,
    Capability = 5,
    InformationElements = 6,
    SignalMbm = 7,
    SignalUnspec = 8,
    Status = 9,
    SeenMsAgo = 10,
    BeaconIes = 11,
}

/// `NL80211_WOWLAN_TRIG_*` attributes.
///
/// In a `SET_WOWLAN` event (a wake report) the same ids carry the reason
/// the system woke instead of the configured triggers.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WowlanTrigger {
    Invalid = 0,
    Any = 1,
    Disconnect = 2,
    MagicPkt = 3,
    PktPattern = 4,
    GtkRekeySupported = 5,
    GtkRekeyFailure = 6,
    EapIdentRequest = 7,
    FourWayHandshake = 8,
    RfkillRelease = 9,
    WakeupPkt80211 = 10,
    WakeupPkt80211Len = 11,
    WakeupPkt8023 = 12,
    WakeupPkt8023Len = 13,
}

// Information element ids inside NL80211_BSS_INFORMATION_ELEMENTS.
pub const IE_SSID: u8 = 0x00;
pub const IE_SUPPORTED_RATES: u8 = 0x01;
pub const IE_EXTENDED_RATES: u8 = 0x32;

const IE_HEADER_LEN: usize = 2;

/// Split BSS information elements into a nested list.
///
/// Each element is a 1-byte type and 1-byte length. The SSID becomes a
/// string attribute named `SSID`; supported and extended rates become a
/// nested `Rates` list of `u8` entries. Other elements are skipped.
pub fn parse_information_elements(
    list: &mut AttributeList,
    id: u16,
    name: &str,
    data: &[u8],
) -> bool {
    list.create_nested(id, name.to_string());
    let Some(elements) = list.get_nested_mut(id) else {
        return false;
    };

    let mut rest = data;
    let mut complete = true;
    while !rest.is_empty() {
        if rest.len() < IE_HEADER_LEN {
            complete = false;
            break;
        }
        let kind = rest[0];
        let len = rest[1] as usize;
        let Some(payload) = rest.get(IE_HEADER_LEN..IE_HEADER_LEN + len) else {
            complete = false;
            break;
        };

        match kind {
            IE_SSID => {
                elements.create::<String>(kind as u16, "SSID");
                elements.set(kind as u16, String::from_utf8_lossy(payload).into_owned());
            }
            IE_SUPPORTED_RATES | IE_EXTENDED_RATES => {
                elements.create_nested(kind as u16, "Rates");
                if let Some(rates) = elements.get_nested_mut(kind as u16) {
                    for (index, rate) in payload.iter().enumerate() {
                        let index = index as u16;
                        rates.create::<u8>(index, format!("Rate-{index}"));
                        rates.set(index, *rate);
                    }
                }
                elements.set_nested_has_value(kind as u16);
            }
            _ => {}
        }
        rest = &rest[IE_HEADER_LEN + len..];
    }

    if !complete {
        tracing::warn!(%name, remaining = rest.len(), "truncated information element");
    }
    list.set_nested_has_value(id);
    complete
}

static BSS: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(BssAttr::Bssid as u16, "NL80211_BSS_BSSID", AttrKind::Raw),
    AttrSpec::new(BssAttr::Frequency as u16, "NL80211_BSS_FREQUENCY", AttrKind::U32),
    AttrSpec::new(BssAttr::Tsf as u16, "NL80211_BSS_TSF", AttrKind::U64),
    AttrSpec::new(BssAttr::BeaconInterval as u16, "NL80211_BSS_BEACON_INTERVAL", AttrKind::U16),
    AttrSpec::new(BssAttr::Capability as u16, "NL80211_BSS_CAPABILITY", AttrKind::U16),
    AttrSpec::custom(
        BssAttr::InformationElements as u16,
        "NL80211_BSS_INFORMATION_ELEMENTS",
        parse_information_elements,
    ),
    AttrSpec::new(BssAttr::SignalMbm as u16, "NL80211_BSS_SIGNAL_MBM", AttrKind::U32),
    AttrSpec::new(BssAttr::SignalUnspec as u16, "NL80211_BSS_SIGNAL_UNSPEC", AttrKind::U8),
    AttrSpec::new(BssAttr::Status as u16, "NL80211_BSS_STATUS", AttrKind::U32),
    AttrSpec::new(BssAttr::SeenMsAgo as u16, "NL80211_BSS_SEEN_MS_AGO", AttrKind::U32),
    AttrSpec::new(BssAttr::BeaconIes as u16, "NL80211_BSS_BEACON_IES", AttrKind::Raw),
]);

// WIPHY_BANDS: array of bands, each holding arrays of frequencies and rates.
static FREQUENCY: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_FREQUENCY_ATTR_FREQ", AttrKind::U32),
    AttrSpec::new(2, "NL80211_FREQUENCY_ATTR_DISABLED", AttrKind::Flag),
    AttrSpec::new(3, "NL80211_FREQUENCY_ATTR_PASSIVE_SCAN", AttrKind::Flag),
    AttrSpec::new(4, "NL80211_FREQUENCY_ATTR_NO_IBSS", AttrKind::Flag),
    AttrSpec::new(5, "NL80211_FREQUENCY_ATTR_RADAR", AttrKind::Flag),
    AttrSpec::new(6, "NL80211_FREQUENCY_ATTR_MAX_TX_POWER", AttrKind::U32),
]);

static FREQUENCIES: NestedSchema =
    NestedSchema::Array(AttrSpec::nested(0, "NL80211_BAND_ATTR_FREQ", &FREQUENCY));

static BITRATE: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_BITRATE_ATTR_RATE", AttrKind::U32),
    AttrSpec::new(2, "NL80211_BITRATE_ATTR_2GHZ_SHORTPREAMBLE", AttrKind::Flag),
]);

static BITRATES: NestedSchema =
    NestedSchema::Array(AttrSpec::nested(0, "NL80211_BAND_ATTR_RATE", &BITRATE));

static BAND: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::nested(1, "NL80211_BAND_ATTR_FREQS", &FREQUENCIES),
    AttrSpec::nested(2, "NL80211_BAND_ATTR_RATES", &BITRATES),
    AttrSpec::new(3, "NL80211_BAND_ATTR_HT_MCS_SET", AttrKind::Raw),
    AttrSpec::new(4, "NL80211_BAND_ATTR_HT_CAPA", AttrKind::U16),
    AttrSpec::new(5, "NL80211_BAND_ATTR_HT_AMPDU_FACTOR", AttrKind::U8),
    AttrSpec::new(6, "NL80211_BAND_ATTR_HT_AMPDU_DENSITY", AttrKind::U8),
]);

static BANDS: NestedSchema = NestedSchema::Array(AttrSpec::nested(0, "NL80211_ATTR_BANDS", &BAND));

static RATE_INFO: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_RATE_INFO_BITRATE", AttrKind::U16),
    AttrSpec::new(2, "NL80211_RATE_INFO_MCS", AttrKind::U8),
    AttrSpec::new(3, "NL80211_RATE_INFO_40_MHZ_WIDTH", AttrKind::Flag),
    AttrSpec::new(4, "NL80211_RATE_INFO_SHORT_GI", AttrKind::Flag),
    AttrSpec::new(5, "NL80211_RATE_INFO_BITRATE32", AttrKind::U32),
    AttrSpec::new(6, "NL80211_RATE_INFO_VHT_MCS", AttrKind::U8),
    AttrSpec::new(7, "NL80211_RATE_INFO_VHT_NSS", AttrKind::U8),
    AttrSpec::new(8, "NL80211_RATE_INFO_80_MHZ_WIDTH", AttrKind::Flag),
    AttrSpec::new(9, "NL80211_RATE_INFO_80P80_MHZ_WIDTH", AttrKind::Flag),
    AttrSpec::new(10, "NL80211_RATE_INFO_160_MHZ_WIDTH", AttrKind::Flag),
]);

static STA_BSS_PARAM: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_STA_BSS_PARAM_CTS_PROT", AttrKind::Flag),
    AttrSpec::new(2, "NL80211_STA_BSS_PARAM_SHORT_PREAMBLE", AttrKind::Flag),
    AttrSpec::new(3, "NL80211_STA_BSS_PARAM_SHORT_SLOT_TIME", AttrKind::Flag),
    AttrSpec::new(4, "NL80211_STA_BSS_PARAM_DTIM_PERIOD", AttrKind::U8),
    AttrSpec::new(5, "NL80211_STA_BSS_PARAM_BEACON_INTERVAL", AttrKind::U16),
]);

static STA_INFO: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_STA_INFO_INACTIVE_TIME", AttrKind::U32),
    AttrSpec::new(2, "NL80211_STA_INFO_RX_BYTES", AttrKind::U32),
    AttrSpec::new(3, "NL80211_STA_INFO_TX_BYTES", AttrKind::U32),
    AttrSpec::new(4, "NL80211_STA_INFO_LLID", AttrKind::U16),
    AttrSpec::new(5, "NL80211_STA_INFO_PLID", AttrKind::U16),
    AttrSpec::new(6, "NL80211_STA_INFO_PLINK_STATE", AttrKind::U8),
    AttrSpec::new(7, "NL80211_STA_INFO_SIGNAL", AttrKind::U8),
    AttrSpec::nested(8, "NL80211_STA_INFO_TX_BITRATE", &RATE_INFO),
    AttrSpec::new(9, "NL80211_STA_INFO_RX_PACKETS", AttrKind::U32),
    AttrSpec::new(10, "NL80211_STA_INFO_TX_PACKETS", AttrKind::U32),
    AttrSpec::new(11, "NL80211_STA_INFO_TX_RETRIES", AttrKind::U32),
    AttrSpec::new(12, "NL80211_STA_INFO_TX_FAILED", AttrKind::U32),
    AttrSpec::new(13, "NL80211_STA_INFO_SIGNAL_AVG", AttrKind::U8),
    AttrSpec::nested(14, "NL80211_STA_INFO_RX_BITRATE", &RATE_INFO),
    AttrSpec::nested(15, "NL80211_STA_INFO_BSS_PARAM", &STA_BSS_PARAM),
    AttrSpec::new(16, "NL80211_STA_INFO_CONNECTED_TIME", AttrKind::U32),
    AttrSpec::new(17, "NL80211_STA_INFO_STA_FLAGS", AttrKind::U64),
    AttrSpec::new(18, "NL80211_STA_INFO_BEACON_LOSS", AttrKind::U32),
]);

static SURVEY_INFO: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_SURVEY_INFO_FREQUENCY", AttrKind::U32),
    AttrSpec::new(2, "NL80211_SURVEY_INFO_NOISE", AttrKind::U8),
    AttrSpec::new(3, "NL80211_SURVEY_INFO_IN_USE", AttrKind::Flag),
    AttrSpec::new(4, "NL80211_SURVEY_INFO_CHANNEL_TIME", AttrKind::U64),
    AttrSpec::new(5, "NL80211_SURVEY_INFO_CHANNEL_TIME_BUSY", AttrKind::U64),
    AttrSpec::new(6, "NL80211_SURVEY_INFO_CHANNEL_TIME_EXT_BUSY", AttrKind::U64),
    AttrSpec::new(7, "NL80211_SURVEY_INFO_CHANNEL_TIME_RX", AttrKind::U64),
    AttrSpec::new(8, "NL80211_SURVEY_INFO_CHANNEL_TIME_TX", AttrKind::U64),
]);

static CQM: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_ATTR_CQM_RSSI_THOLD", AttrKind::U32),
    AttrSpec::new(2, "NL80211_ATTR_CQM_RSSI_HYST", AttrKind::U32),
    AttrSpec::new(3, "NL80211_ATTR_CQM_RSSI_THRESHOLD_EVENT", AttrKind::U32),
    AttrSpec::new(4, "NL80211_ATTR_CQM_PKT_LOSS_EVENT", AttrKind::U32),
]);

static PACKET_PATTERN: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_PKTPAT_MASK", AttrKind::Raw),
    AttrSpec::new(2, "NL80211_PKTPAT_PATTERN", AttrKind::Raw),
    AttrSpec::new(3, "NL80211_PKTPAT_OFFSET", AttrKind::U32),
]);

static PACKET_PATTERNS: NestedSchema =
    NestedSchema::Array(AttrSpec::nested(0, "NL80211_PACKET_PATTERN_ATTR", &PACKET_PATTERN));

static WOWLAN_TRIGGERS: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(WowlanTrigger::Any as u16, "NL80211_WOWLAN_TRIG_ANY", AttrKind::Flag),
    AttrSpec::new(
        WowlanTrigger::Disconnect as u16,
        "NL80211_WOWLAN_TRIG_DISCONNECT",
        AttrKind::Flag,
    ),
    AttrSpec::new(WowlanTrigger::MagicPkt as u16, "NL80211_WOWLAN_TRIG_MAGIC_PKT", AttrKind::Flag),
    AttrSpec::nested(
        WowlanTrigger::PktPattern as u16,
        "NL80211_WOWLAN_TRIG_PKT_PATTERN",
        &PACKET_PATTERNS,
    ),
]);

static WOWLAN_TRIGGERS_SUPPORTED: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(WowlanTrigger::Any as u16, "NL80211_WOWLAN_TRIG_ANY", AttrKind::Flag),
    AttrSpec::new(
        WowlanTrigger::Disconnect as u16,
        "NL80211_WOWLAN_TRIG_DISCONNECT",
        AttrKind::Flag,
    ),
    AttrSpec::new(WowlanTrigger::MagicPkt as u16, "NL80211_WOWLAN_TRIG_MAGIC_PKT", AttrKind::Flag),
    AttrSpec::new(WowlanTrigger::PktPattern as u16, "NL80211_WOWLAN_TRIG_PKT_PATTERN", AttrKind::Raw),
]);

static WAKE_REASON: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(WowlanTrigger::Any as u16, "NL80211_WOWLAN_TRIG_ANY", AttrKind::Flag),
    AttrSpec::new(
        WowlanTrigger::Disconnect as u16,
        "NL80211_WOWLAN_TRIG_DISCONNECT",
        AttrKind::Flag,
    ),
    AttrSpec::new(WowlanTrigger::MagicPkt as u16, "NL80211_WOWLAN_TRIG_MAGIC_PKT", AttrKind::Flag),
    AttrSpec::new(WowlanTrigger::PktPattern as u16, "NL80211_WOWLAN_TRIG_PKT_PATTERN", AttrKind::U32),
    AttrSpec::new(
        WowlanTrigger::GtkRekeySupported as u16,
        "NL80211_WOWLAN_TRIG_GTK_REKEY_SUPPORTED",
        AttrKind::Flag,
    ),
    AttrSpec::new(
        WowlanTrigger::GtkRekeyFailure as u16,
        "NL80211_WOWLAN_TRIG_GTK_REKEY_FAILURE",
        AttrKind::Flag,
    ),
    AttrSpec::new(
        WowlanTrigger::EapIdentRequest as u16,
        "NL80211_WOWLAN_TRIG_EAP_IDENT_REQUEST",
        AttrKind::Flag,
    ),
    AttrSpec::new(
        WowlanTrigger::FourWayHandshake as u16,
        "NL80211_WOWLAN_TRIG_4WAY_HANDSHAKE",
        AttrKind::Flag,
    ),
    AttrSpec::new(
        WowlanTrigger::RfkillRelease as u16,
        "NL80211_WOWLAN_TRIG_RFKILL_RELEASE",
        AttrKind::Flag,
    ),
    AttrSpec::new(
        WowlanTrigger::WakeupPkt80211 as u16,
        "NL80211_WOWLAN_TRIG_WAKEUP_PKT_80211",
        AttrKind::Raw,
    ),
    AttrSpec::new(
        WowlanTrigger::WakeupPkt80211Len as u16,
        "NL80211_WOWLAN_TRIG_WAKEUP_PKT_80211_LEN",
        AttrKind::U32,
    ),
    AttrSpec::new(
        WowlanTrigger::WakeupPkt8023 as u16,
        "NL80211_WOWLAN_TRIG_WAKEUP_PKT_8023",
        AttrKind::Raw,
    ),
    AttrSpec::new(
        WowlanTrigger::WakeupPkt8023Len as u16,
        "NL80211_WOWLAN_TRIG_WAKEUP_PKT_8023_LEN",
        AttrKind::U32,
    ),
]);

static SCAN_FREQUENCIES: NestedSchema =
    NestedSchema::Array(AttrSpec::new(0, "NL80211_SCAN_FREQ", AttrKind::U32));

static SCAN_SSIDS: NestedSchema =
    NestedSchema::Array(AttrSpec::new(0, "NL80211_SCAN_SSID", AttrKind::String));

static SUPPORTED_IFTYPES: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_IFTYPE_ADHOC", AttrKind::Flag),
    AttrSpec::new(2, "NL80211_IFTYPE_STATION", AttrKind::Flag),
    AttrSpec::new(3, "NL80211_IFTYPE_AP", AttrKind::Flag),
    AttrSpec::new(4, "NL80211_IFTYPE_AP_VLAN", AttrKind::Flag),
    AttrSpec::new(5, "NL80211_IFTYPE_WDS", AttrKind::Flag),
    AttrSpec::new(6, "NL80211_IFTYPE_MONITOR", AttrKind::Flag),
    AttrSpec::new(7, "NL80211_IFTYPE_MESH_POINT", AttrKind::Flag),
    AttrSpec::new(8, "NL80211_IFTYPE_P2P_CLIENT", AttrKind::Flag),
    AttrSpec::new(9, "NL80211_IFTYPE_P2P_GO", AttrKind::Flag),
    AttrSpec::new(10, "NL80211_IFTYPE_P2P_DEVICE", AttrKind::Flag),
]);

static PMKSA_CANDIDATE: NestedSchema = NestedSchema::Structure(&[
    AttrSpec::new(1, "NL80211_PMKSA_CANDIDATE_INDEX", AttrKind::U32),
    AttrSpec::new(2, "NL80211_PMKSA_CANDIDATE_BSSID", AttrKind::Raw),
    AttrSpec::new(3, "NL80211_PMKSA_CANDIDATE_PREAUTH", AttrKind::Flag),
]);

macro_rules! attr {
    ($id:ident, $name:literal, $kind:ident) => {
        AttrSpec::new(Nl80211Attr::$id as u16, $name, AttrKind::$kind)
    };
    ($id:ident, $name:literal, nested $schema:ident) => {
        AttrSpec::nested(Nl80211Attr::$id as u16, $name, &$schema)
    };
}

/// Every top-level attribute with a declared type.
pub static NL80211_ATTRIBUTES: NestedSchema = NestedSchema::Structure(&[
    attr!(Wiphy, "NL80211_ATTR_WIPHY", U32),
    attr!(WiphyName, "NL80211_ATTR_WIPHY_NAME", String),
    attr!(Ifindex, "NL80211_ATTR_IFINDEX", U32),
    attr!(Ifname, "NL80211_ATTR_IFNAME", String),
    attr!(Iftype, "NL80211_ATTR_IFTYPE", U32),
    attr!(Mac, "NL80211_ATTR_MAC", Raw),
    attr!(KeyData, "NL80211_ATTR_KEY_DATA", Raw),
    attr!(KeyIdx, "NL80211_ATTR_KEY_IDX", U8),
    attr!(KeyCipher, "NL80211_ATTR_KEY_CIPHER", U32),
    attr!(KeySeq, "NL80211_ATTR_KEY_SEQ", Raw),
    attr!(StaInfo, "NL80211_ATTR_STA_INFO", nested STA_INFO),
    attr!(WiphyBands, "NL80211_ATTR_WIPHY_BANDS", nested BANDS),
    attr!(SupportedIftypes, "NL80211_ATTR_SUPPORTED_IFTYPES", nested SUPPORTED_IFTYPES),
    attr!(RegAlpha2, "NL80211_ATTR_REG_ALPHA2", String),
    attr!(WiphyFreq, "NL80211_ATTR_WIPHY_FREQ", U32),
    attr!(Ie, "NL80211_ATTR_IE", Raw),
    attr!(MaxNumScanSsids, "NL80211_ATTR_MAX_NUM_SCAN_SSIDS", U8),
    attr!(ScanFrequencies, "NL80211_ATTR_SCAN_FREQUENCIES", nested SCAN_FREQUENCIES),
    attr!(ScanSsids, "NL80211_ATTR_SCAN_SSIDS", nested SCAN_SSIDS),
    attr!(Generation, "NL80211_ATTR_GENERATION", U32),
    attr!(Bss, "NL80211_ATTR_BSS", nested BSS),
    attr!(RegInitiator, "NL80211_ATTR_REG_INITIATOR", U8),
    attr!(RegType, "NL80211_ATTR_REG_TYPE", U8),
    attr!(Frame, "NL80211_ATTR_FRAME", Raw),
    attr!(Ssid, "NL80211_ATTR_SSID", Raw),
    attr!(AuthType, "NL80211_ATTR_AUTH_TYPE", U32),
    attr!(ReasonCode, "NL80211_ATTR_REASON_CODE", U16),
    attr!(KeyType, "NL80211_ATTR_KEY_TYPE", U32),
    attr!(MaxScanIeLen, "NL80211_ATTR_MAX_SCAN_IE_LEN", U16),
    attr!(CipherSuites, "NL80211_ATTR_CIPHER_SUITES", Raw),
    attr!(WiphyRetryShort, "NL80211_ATTR_WIPHY_RETRY_SHORT", U8),
    attr!(WiphyRetryLong, "NL80211_ATTR_WIPHY_RETRY_LONG", U8),
    attr!(WiphyFragThreshold, "NL80211_ATTR_WIPHY_FRAG_THRESHOLD", U32),
    attr!(WiphyRtsThreshold, "NL80211_ATTR_WIPHY_RTS_THRESHOLD", U32),
    attr!(TimedOut, "NL80211_ATTR_TIMED_OUT", Flag),
    attr!(DisconnectedByAp, "NL80211_ATTR_DISCONNECTED_BY_AP", Flag),
    attr!(StatusCode, "NL80211_ATTR_STATUS_CODE", U16),
    attr!(ReqIe, "NL80211_ATTR_REQ_IE", Raw),
    attr!(RespIe, "NL80211_ATTR_RESP_IE", Raw),
    attr!(SurveyInfo, "NL80211_ATTR_SURVEY_INFO", nested SURVEY_INFO),
    attr!(MaxNumPmkids, "NL80211_ATTR_MAX_NUM_PMKIDS", U8),
    attr!(Duration, "NL80211_ATTR_DURATION", U32),
    attr!(Cookie, "NL80211_ATTR_COOKIE", U64),
    attr!(WiphyCoverageClass, "NL80211_ATTR_WIPHY_COVERAGE_CLASS", U8),
    attr!(Ack, "NL80211_ATTR_ACK", Flag),
    attr!(Cqm, "NL80211_ATTR_CQM", nested CQM),
    attr!(ControlPortEthertype, "NL80211_ATTR_CONTROL_PORT_ETHERTYPE", Flag),
    attr!(SupportIbssRsn, "NL80211_ATTR_SUPPORT_IBSS_RSN", Flag),
    attr!(WiphyAntennaTx, "NL80211_ATTR_WIPHY_ANTENNA_TX", U32),
    attr!(WiphyAntennaRx, "NL80211_ATTR_WIPHY_ANTENNA_RX", U32),
    attr!(OffchannelTxOk, "NL80211_ATTR_OFFCHANNEL_TX_OK", Flag),
    attr!(MaxRemainOnChannelDuration, "NL80211_ATTR_MAX_REMAIN_ON_CHANNEL_DURATION", U32),
    attr!(WiphyAntennaAvailTx, "NL80211_ATTR_WIPHY_ANTENNA_AVAIL_TX", U32),
    attr!(WiphyAntennaAvailRx, "NL80211_ATTR_WIPHY_ANTENNA_AVAIL_RX", U32),
    attr!(SupportMeshAuth, "NL80211_ATTR_SUPPORT_MESH_AUTH", Flag),
    attr!(WowlanTriggers, "NL80211_ATTR_WOWLAN_TRIGGERS", nested WOWLAN_TRIGGERS),
    attr!(
        WowlanTriggersSupported,
        "NL80211_ATTR_WOWLAN_TRIGGERS_SUPPORTED",
        nested WOWLAN_TRIGGERS_SUPPORTED
    ),
    attr!(MaxNumSchedScanSsids, "NL80211_ATTR_MAX_NUM_SCHED_SCAN_SSIDS", U8),
    attr!(MaxSchedScanIeLen, "NL80211_ATTR_MAX_SCHED_SCAN_IE_LEN", U16),
    attr!(SupportApUapsd, "NL80211_ATTR_SUPPORT_AP_UAPSD", Flag),
    attr!(RoamSupport, "NL80211_ATTR_ROAM_SUPPORT", Flag),
    attr!(MaxMatchSets, "NL80211_ATTR_MAX_MATCH_SETS", U8),
    attr!(PmksaCandidate, "NL80211_ATTR_PMKSA_CANDIDATE", nested PMKSA_CANDIDATE),
    attr!(TdlsSupport, "NL80211_ATTR_TDLS_SUPPORT", Flag),
    attr!(TdlsExternalSetup, "NL80211_ATTR_TDLS_EXTERNAL_SETUP", Flag),
    attr!(DeviceApSme, "NL80211_ATTR_DEVICE_AP_SME", U32),
    attr!(FeatureFlags, "NL80211_ATTR_FEATURE_FLAGS", U32),
    attr!(ProbeRespOffload, "NL80211_ATTR_PROBE_RESP_OFFLOAD", U32),
    attr!(HtCapabilityMask, "NL80211_ATTR_HT_CAPABILITY_MASK", Raw),
]);

/// `WOWLAN_TRIGGERS` as reported in a wake event.
pub static WAKE_REASON_ATTRIBUTES: [AttrSpec; 1] =
    [attr!(WowlanTriggers, "NL80211_ATTR_WOWLAN_TRIGGERS", nested WAKE_REASON)];

/// Look up a top-level attribute declaration.
pub fn lookup(id: u16) -> Option<&'static AttrSpec> {
    NL80211_ATTRIBUTES.lookup(id)
}
